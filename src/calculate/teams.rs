//! Two-player team compositions grouped by the races on the field.

use std::collections::BTreeMap;

use crate::models::{describe_slot, TeamCounter, TeamGroup, TeamVariant, WinLoss};

/// Fixed grouping of `wlp` keys. A group collects every composition that
/// ends up with the same pair of races, whether picked or randomed into.
pub const TEAM_GROUPS: [(&str, &[&str]); 6] = [
    ("pz", &["ppzz", "pprz", "zzrp", "rprz"]),
    ("tz", &["ttzz", "ttrz", "zzrt", "rtrz"]),
    ("zz", &["zzzz", "zzrz", "rzrz"]),
    ("pt", &["pptt", "pprt", "ttrp", "rprt"]),
    ("pp", &["pppp", "pprp", "rprp"]),
    ("tt", &["tttt", "ttrt", "rtrt"]),
];

/// Human-readable label for a 4-letter team key, e.g. `pprz` is
/// "Protoss + Random → Zerg". Unknown shapes fall back to the key itself.
pub fn team_label(key: &str) -> String {
    if key.len() != 4 || !key.is_ascii() {
        return key.to_string();
    }
    let (first, second) = key.split_at(2);
    match (describe_slot(first), describe_slot(second)) {
        (Some(a), Some(b)) => format!("{} + {}", a, b),
        _ => key.to_string(),
    }
}

/// Sum `wlp` counters into the six team groups, best win rate first.
///
/// Members absent from the data are skipped; a group with no members present
/// reports zero games and a 0% win rate.
pub fn team_groups(wlp: &BTreeMap<String, TeamCounter>) -> Vec<TeamGroup> {
    let mut groups: Vec<TeamGroup> = TEAM_GROUPS
        .iter()
        .map(|(group, members)| {
            let mut variants: Vec<TeamVariant> = members
                .iter()
                .filter_map(|&key| {
                    let record = wlp.get(key)?.normalize();
                    Some(TeamVariant {
                        key: key.to_string(),
                        label: team_label(key),
                        wins: record.wins,
                        losses: record.losses,
                        total: record.total(),
                        win_rate: record.win_rate(),
                    })
                })
                .collect();

            let summed: WinLoss = variants
                .iter()
                .map(|v| WinLoss::new(v.wins, v.losses))
                .sum();
            variants.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));

            TeamGroup {
                group: group.to_string(),
                wins: summed.wins,
                losses: summed.losses,
                total: summed.total(),
                win_rate: summed.win_rate(),
                variants,
            }
        })
        .collect();

    groups.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wlp(json: &str) -> BTreeMap<String, TeamCounter> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_team_label() {
        assert_eq!(team_label("pprz"), "Protoss + Random → Zerg");
        assert_eq!(team_label("rprt"), "Random → Protoss + Random → Terran");
        assert_eq!(team_label("zzzz"), "Zerg + Zerg");
        assert_eq!(team_label("pz"), "pz");
    }

    #[test]
    fn test_team_groups_sum_members() {
        let data = wlp(r#"{"pptt": [6, 10], "pprt": [2, 4]}"#);

        let groups = team_groups(&data);

        let pt = groups.iter().find(|g| g.group == "pt").unwrap();
        assert_eq!(pt.wins, 8);
        assert_eq!(pt.losses, 6);
        assert_eq!(pt.total, 14);
        assert!((pt.win_rate - 57.142857).abs() < 1e-4);
        assert_eq!(pt.variants.len(), 2);
        assert_eq!(pt.variants[0].key, "pptt");
        assert_eq!(groups[0].group, "pt");
    }

    #[test]
    fn test_team_groups_accept_both_encodings() {
        let data = wlp(r#"{"ppzz": {"wins": 3, "losses": 1}, "rprz": [1, 4]}"#);

        let groups = team_groups(&data);

        let pz = groups.iter().find(|g| g.group == "pz").unwrap();
        assert_eq!(pz.wins, 4);
        assert_eq!(pz.losses, 4);
        assert_eq!(pz.win_rate, 50.0);
    }

    #[test]
    fn test_empty_groups_have_zero_rate() {
        let groups = team_groups(&BTreeMap::new());

        assert_eq!(groups.len(), 6);
        for group in &groups {
            assert_eq!(group.total, 0);
            assert_eq!(group.win_rate, 0.0);
            assert!(group.variants.is_empty());
        }
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let data = wlp(r#"{"pzpz": [9, 9], "tttt": [1, 2]}"#);

        let groups = team_groups(&data);

        let total: u32 = groups.iter().map(|g| g.total).sum();
        assert_eq!(total, 2);
        assert_eq!(groups[0].group, "tt");
    }
}
