//! Final list ordering: purchased slots first, vote counts fill the rest

use crate::ledger::Event;

pub struct RankingMerger;

impl RankingMerger {
    pub fn new() -> Self {
        Self
    }

    /// Order `events` for display
    ///
    /// Ranked events sit at their 1-based slot. The remaining positions are
    /// filled left to right with unranked events by descending vote count.
    /// An event whose slot is beyond the list length, or already taken by an
    /// earlier event, is treated as unranked, so the output is always a
    /// permutation of the input.
    pub fn merge(&self, events: Vec<Event>) -> Vec<Event> {
        let len = events.len();
        let (mut ranked, mut unranked): (Vec<Event>, Vec<Event>) =
            events.into_iter().partition(Event::is_ranked);

        ranked.sort_by_key(|event| event.ranking);

        let mut slots: Vec<Option<Event>> = vec![None; len];
        for event in ranked {
            let index = event.ranking as usize - 1;
            match slots.get_mut(index) {
                Some(slot) if slot.is_none() => *slot = Some(event),
                _ => {
                    log::warn!(
                        "Event {} holds unusable ranking {} (list of {}), ordering by votes",
                        event.id,
                        event.ranking,
                        len
                    );
                    unranked.push(event);
                }
            }
        }

        unranked.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));

        let mut fill = unranked.into_iter();
        slots
            .into_iter()
            .filter_map(|slot| slot.or_else(|| fill.next()))
            .collect()
    }
}

impl Default for RankingMerger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(name: &str, vote_count: i64, ranking: u32) -> Event {
        Event {
            id: 0,
            name: name.to_string(),
            keyword: name.to_string(),
            vote_count,
            ranking,
            user_id: 1,
        }
    }

    fn names(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_sort_by_vote_count_and_trade_ranking() {
        let events = vec![
            make_event("ttt", 5, 0),
            make_event("qqq", 2, 0),
            make_event("eee", 3, 1),
            make_event("rrr", 9, 3),
            make_event("yyy", 8, 0),
        ];

        let sorted = RankingMerger::new().merge(events);

        assert_eq!(names(&sorted), vec!["eee", "yyy", "rrr", "ttt", "qqq"]);
    }

    #[test]
    fn test_unranked_only_orders_by_votes() {
        let events = vec![
            make_event("low", 1, 0),
            make_event("high", 10, 0),
            make_event("mid", 5, 0),
        ];

        let sorted = RankingMerger::new().merge(events);

        assert_eq!(names(&sorted), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ranked_only_orders_by_slot() {
        let events = vec![
            make_event("third", 0, 3),
            make_event("first", 0, 1),
            make_event("second", 0, 2),
        ];

        let sorted = RankingMerger::new().merge(events);

        assert_eq!(names(&sorted), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_out_of_range_and_duplicate_slots_are_demoted() {
        let events = vec![
            make_event("a", 1, 1),
            make_event("dup", 7, 1),
            make_event("far", 4, 9),
            make_event("b", 2, 0),
        ];

        let sorted = RankingMerger::new().merge(events);

        // "a" keeps slot 1, the rest compete on votes
        assert_eq!(names(&sorted), vec!["a", "dup", "far", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(RankingMerger::new().merge(Vec::new()).is_empty());
    }
}
