//! Basic strategies: random groups and groups by speed.
//!
//! Both strategies only place competitors; no staffing duties are handed
//! out. Group numbers run `1..=scrambleGroups` regardless of stages.

use rand::Rng;

use crate::config::EventConfiguration;
use crate::error::Result;
use crate::label::Label;
use crate::roster::Roster;

use super::reposition::move_top_competitors;

/// Shuffles the roster and deals competitors round robin over the groups.
///
/// The fastest `top_limit` competitors of scramble-dependent events are
/// moved to tail positions before dealing.
pub fn assign_random<R: Rng>(
    roster: &mut Roster,
    event_id: &str,
    configuration: &EventConfiguration,
    top_limit: usize,
    rng: &mut R,
) -> Result<()> {
    roster.shuffle(rng);

    let mut competitors = roster.competing_indices(event_id);
    move_top_competitors(roster, &mut competitors, event_id, configuration, top_limit)?;

    let groups = configuration.scramble_groups.max(1);
    for (i, &index) in competitors.iter().enumerate() {
        roster.assign_label(index, event_id, Label::competing(i as u32 % groups + 1));
    }
    tracing::debug!(event_id, competitors = competitors.len(), groups, "assigned random groups");
    Ok(())
}

/// Sorts by personal best and cuts the competitors into contiguous groups.
///
/// Chunks hold `⌈n / scrambleGroups⌉` competitors, so the last group may be
/// smaller. With `reverse` the slowest compete first.
pub fn assign_by_speed(roster: &mut Roster, event_id: &str, configuration: &EventConfiguration, reverse: bool) {
    roster.sort_by_speed(event_id, reverse);

    let competitors = roster.competing_indices(event_id);
    let groups = configuration.scramble_groups.max(1) as usize;
    let size = competitors.len().div_ceil(groups).max(1);
    for (i, &index) in competitors.iter().enumerate() {
        roster.assign_label(index, event_id, Label::competing((i / size + 1) as u32));
    }
    tracing::debug!(event_id, competitors = competitors.len(), size, reverse, "assigned groups by speed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Person;
    use crate::roster::RosterQuery;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn roster(event_id: &str, n: i64) -> Roster {
        Roster::from_persons(
            (0..n)
                .map(|i| {
                    Person::new(i, format!("P{i:02}"))
                        .with_events(&[event_id])
                        .with_single(event_id, 1000 + i * 10)
                })
                .chain(std::iter::once(Person::new(99, "Spectator").with_events(&[])))
                .collect(),
            &[event_id],
        )
    }

    #[test]
    fn test_random_groups_are_balanced() {
        for seed in 0..20 {
            let mut roster = roster("333", 20);
            let config = EventConfiguration::new(2, 1);
            assign_random(&mut roster, "333", &config, 5, &mut SmallRng::seed_from_u64(seed)).unwrap();

            let labels: Vec<String> = roster
                .iter()
                .filter(|c| c.is_competing("333"))
                .map(|c| c.label("333").to_string())
                .collect();
            assert!(labels.iter().all(|l| l == "1" || l == "2"));
            let ones = roster.count_competitors("333", 1);
            let twos = roster.count_competitors("333", 2);
            assert_eq!(ones + twos, 20);
            assert!(ones.abs_diff(twos) <= 1);
        }
    }

    #[test]
    fn test_random_groups_leave_non_competitors_alone() {
        let mut roster = roster("444", 7);
        let config = EventConfiguration::new(3, 1);
        assign_random(&mut roster, "444", &config, 5, &mut SmallRng::seed_from_u64(3)).unwrap();

        let spectator = roster.iter().find(|c| c.name() == "Spectator").unwrap();
        assert!(spectator.label("444").is_empty());
        for group in 1..=3 {
            let count = roster.count_competitors("444", group);
            assert!((2..=3).contains(&count), "group {group} has {count}");
        }
    }

    #[test]
    fn test_by_speed_fastest_first() {
        let mut roster = roster("333", 7);
        assign_by_speed(&mut roster, "333", &EventConfiguration::new(2, 1), false);

        let fastest = roster.iter().find(|c| c.name() == "P00").unwrap();
        let slowest = roster.iter().find(|c| c.name() == "P06").unwrap();
        assert_eq!(fastest.label("333"), Label::competing(1));
        assert_eq!(slowest.label("333"), Label::competing(2));
        // ⌈7 / 2⌉ = 4 in the first group.
        assert_eq!(roster.count_competitors("333", 1), 4);
        assert_eq!(roster.count_competitors("333", 2), 3);
    }

    #[test]
    fn test_by_speed_reverse() {
        let mut roster = roster("333", 6);
        assign_by_speed(&mut roster, "333", &EventConfiguration::new(3, 1), true);

        let fastest = roster.iter().find(|c| c.name() == "P00").unwrap();
        let slowest = roster.iter().find(|c| c.name() == "P05").unwrap();
        assert_eq!(fastest.label("333"), Label::competing(3));
        assert_eq!(slowest.label("333"), Label::competing(1));
    }
}
