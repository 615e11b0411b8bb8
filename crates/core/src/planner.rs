use serde::Serialize;
use types::{TimeBlock, TimeGrid, Weekday};

/// Added to the priority of every pattern that uses Saturday.
pub const SATURDAY_PENALTY: f64 = 10.0;

pub const DEFAULT_STRATEGY_LIMIT: usize = 5;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DayPattern {
    MonWedFri,
    TueThu,
    MonWedFriSat,
}

impl DayPattern {
    pub const ALL: [DayPattern; 3] = [
        DayPattern::MonWedFri,
        DayPattern::TueThu,
        DayPattern::MonWedFriSat,
    ];

    pub const fn weekdays(self) -> &'static [Weekday] {
        match self {
            DayPattern::MonWedFri => &[Weekday::Mon, Weekday::Wed, Weekday::Fri],
            DayPattern::TueThu => &[Weekday::Tue, Weekday::Thu],
            DayPattern::MonWedFriSat => &[Weekday::Mon, Weekday::Wed, Weekday::Fri, Weekday::Sat],
        }
    }

    pub fn includes_saturday(self) -> bool {
        self.weekdays().contains(&Weekday::Sat)
    }

    pub const fn label(self) -> &'static str {
        match self {
            DayPattern::MonWedFri => "Mon-Wed-Fri",
            DayPattern::TueThu => "Tue-Thu",
            DayPattern::MonWedFriSat => "Mon-Wed-Fri-Sat",
        }
    }
}

/// One pattern applied to one block, scored against a weekly-hour target.
#[derive(Clone, Debug, PartialEq)]
pub struct Strategy<'g> {
    pub pattern: DayPattern,
    pub block: &'g TimeBlock,
    pub total_hours: f64,
    pub priority: f64,
}

impl Strategy<'_> {
    pub fn weekdays(&self) -> &'static [Weekday] {
        self.pattern.weekdays()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StrategyPlanner {
    limit: Option<usize>,
}

impl Default for StrategyPlanner {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_STRATEGY_LIMIT),
        }
    }
}

impl StrategyPlanner {
    /// `None` keeps every ranked strategy.
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }

    /// Ranks every offered (pattern, block) pair by how close its weekly hours
    /// come to `required_hours`, lowest priority first.
    pub fn plan<'g>(&self, required_hours: u32, grid: &'g TimeGrid) -> Vec<Strategy<'g>> {
        let required = f64::from(required_hours);
        let patterns: Vec<DayPattern> = DayPattern::ALL
            .into_iter()
            .filter(|p| p.weekdays().iter().all(|d| grid.offers(*d)))
            .collect();

        let mut strategies: Vec<Strategy<'g>> = grid
            .ordered_blocks()
            .into_iter()
            .flat_map(|block| {
                patterns.iter().map(move |&pattern| {
                    let total_hours = block.hours() * pattern.weekdays().len() as f64;
                    let mut priority = (total_hours - required).abs();
                    if pattern.includes_saturday() {
                        priority += SATURDAY_PENALTY;
                    }
                    Strategy {
                        pattern,
                        block,
                        total_hours,
                        priority,
                    }
                })
            })
            .collect();

        strategies.sort_by(|a, b| a.priority.total_cmp(&b.priority));
        if let Some(limit) = self.limit {
            strategies.truncate(limit);
        }
        strategies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{block, grid};
    use proptest::prelude::*;

    #[test]
    fn exact_fit_ranks_first() {
        let grid = grid(vec![block("B1", 7, 120), block("B2", 9, 90)]);
        let plan = StrategyPlanner::new(None).plan(6, &grid);

        let best = &plan[0];
        assert_eq!(best.pattern, DayPattern::MonWedFri);
        assert_eq!(best.block.id.as_str(), "B1");
        assert_eq!(best.total_hours, 6.0);
        assert_eq!(best.priority, 0.0);
        assert_eq!(plan.len(), 6);
    }

    #[test]
    fn saturday_patterns_carry_the_penalty() {
        let grid = grid(vec![block("B1", 7, 120)]);
        let plan = StrategyPlanner::new(None).plan(8, &grid);

        let with_saturday = plan
            .iter()
            .find(|s| s.pattern == DayPattern::MonWedFriSat)
            .unwrap();
        assert_eq!(with_saturday.total_hours, 8.0);
        assert_eq!(with_saturday.priority, SATURDAY_PENALTY);
        assert_eq!(plan.last().unwrap().pattern, DayPattern::MonWedFriSat);
    }

    #[test]
    fn ties_keep_block_then_pattern_order() {
        // Both blocks are 90 minutes; identical priorities per pattern.
        let grid = grid(vec![block("late", 11, 90), block("early", 7, 90)]);
        let plan = StrategyPlanner::new(None).plan(4, &grid);
        let order: Vec<_> = plan
            .iter()
            .map(|s| (s.block.id.as_str(), s.pattern))
            .collect();

        assert_eq!(
            order,
            vec![
                ("early", DayPattern::MonWedFri),
                ("late", DayPattern::MonWedFri),
                ("early", DayPattern::TueThu),
                ("late", DayPattern::TueThu),
                ("early", DayPattern::MonWedFriSat),
                ("late", DayPattern::MonWedFriSat),
            ]
        );
    }

    #[test]
    fn truncates_to_the_limit() {
        let grid = grid(vec![
            block("B1", 7, 90),
            block("B2", 9, 90),
            block("B3", 11, 90),
        ]);
        assert_eq!(StrategyPlanner::default().plan(4, &grid).len(), 5);
        assert_eq!(StrategyPlanner::new(Some(2)).plan(4, &grid).len(), 2);
        assert_eq!(StrategyPlanner::new(None).plan(4, &grid).len(), 9);
    }

    #[test]
    fn patterns_need_every_weekday_in_the_grid() {
        let mut grid = grid(vec![block("B1", 7, 120)]);
        grid.weekdays.retain(|d| *d != Weekday::Sat && *d != Weekday::Fri);
        let plan = StrategyPlanner::new(None).plan(4, &grid);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].pattern, DayPattern::TueThu);
    }

    #[test]
    fn inactive_blocks_and_empty_grids_plan_nothing() {
        let mut inactive = block("B1", 7, 120);
        inactive.active = false;
        assert!(StrategyPlanner::new(None).plan(6, &grid(vec![inactive])).is_empty());
        assert!(StrategyPlanner::new(None)
            .plan(6, &TimeGrid::default())
            .is_empty());
    }

    proptest! {
        #[test]
        fn plan_is_sorted_by_priority(
            required in 0u32..40,
            minutes in prop::collection::vec(30u32..240, 1..6),
            limit in prop::option::of(0usize..12),
        ) {
            let blocks = minutes
                .iter()
                .enumerate()
                .map(|(i, m)| block(&format!("B{i}"), 7 + i as u32, *m))
                .collect();
            let grid = grid(blocks);
            let plan = StrategyPlanner::new(limit).plan(required, &grid);

            prop_assert!(plan.windows(2).all(|w| w[0].priority <= w[1].priority));
            if let Some(limit) = limit {
                prop_assert!(plan.len() <= limit);
            }
            for s in &plan {
                prop_assert!(!s.weekdays().contains(&Weekday::Sun));
            }
        }
    }
}
