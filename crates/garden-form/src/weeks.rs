//! Query helpers for the booking calendar's week grid.
//!
//! The caller owns both the available weeks and the current selection; this
//! module only answers questions about them.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::WeekError;

/// Days from a week's start date to its last day.
pub const WEEK_SPAN_DAYS: u64 = 6;

/// Inclusive range of week-start dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    /// Builds a range whose ends are both available weeks, `start <= end`.
    pub fn new(start: NaiveDate, end: NaiveDate, weeks: &[NaiveDate]) -> Result<Self, WeekError> {
        for week in [start, end] {
            if !weeks.contains(&week) {
                return Err(WeekError::NotAvailable(week));
            }
        }
        if start > end {
            return Err(WeekError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Available weeks covered by the range, in sequence order.
    pub fn weeks<'a>(&self, weeks: &'a [NaiveDate]) -> Vec<&'a NaiveDate> {
        weeks
            .iter()
            .filter(|week| **week >= self.start && **week <= self.end)
            .collect()
    }
}

/// Per-week state for drawing one cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekCell {
    pub index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub selected: bool,
    pub consecutive: bool,
    pub edge: bool,
    pub first_selected: bool,
}

/// Borrowed view over the master week sequence and the caller's selection.
#[derive(Debug, Clone, Copy)]
pub struct WeekSelection<'a> {
    weeks: &'a [NaiveDate],
    selected: &'a [NaiveDate],
}

impl<'a> WeekSelection<'a> {
    pub fn new(weeks: &'a [NaiveDate], selected: &'a [NaiveDate]) -> Self {
        Self { weeks, selected }
    }

    pub fn is_selected(&self, week: NaiveDate) -> bool {
        self.selected.contains(&week)
    }

    fn position(&self, week: NaiveDate) -> Option<usize> {
        self.weeks.iter().position(|candidate| *candidate == week)
    }

    /// Lowest and highest master-sequence positions among the selected
    /// weeks, whatever order they were selected in.
    fn bounds(&self) -> Option<(usize, usize)> {
        let positions = self
            .selected
            .iter()
            .filter_map(|week| self.position(*week));
        positions.fold(None, |bounds, position| match bounds {
            None => Some((position, position)),
            Some((low, high)) => Some((low.min(position), high.max(position))),
        })
    }

    /// True when `week` sits directly before or after the selected run, so
    /// selecting it would extend the range. Nothing is consecutive to an
    /// empty selection.
    pub fn is_consecutive(&self, week: NaiveDate) -> bool {
        let (Some((first, last)), Some(position)) = (self.bounds(), self.position(week)) else {
            return false;
        };
        position + 1 == first || position == last + 1
    }

    /// True when `week` is the first or last selected week.
    pub fn is_edge(&self, week: NaiveDate) -> bool {
        self.selected.first() == Some(&week) || self.selected.last() == Some(&week)
    }

    pub fn is_first_selected(&self, week: NaiveDate) -> bool {
        self.selected.first() == Some(&week)
    }

    /// True when the selection is a gap-free run of the master sequence.
    pub fn is_contiguous(&self) -> bool {
        let mut positions = Vec::with_capacity(self.selected.len());
        for week in self.selected {
            match self.position(*week) {
                Some(position) => positions.push(position),
                None => return false,
            }
        }
        positions.sort_unstable();
        positions.dedup();
        positions.len() == self.selected.len()
            && positions.windows(2).all(|pair| pair[1] == pair[0] + 1)
    }

    /// The range spanned by the selection, if it is non-empty and contiguous.
    pub fn range(&self) -> Option<WeekRange> {
        if self.selected.is_empty() || !self.is_contiguous() {
            return None;
        }
        let (first, last) = self.bounds()?;
        Some(WeekRange {
            start: self.weeks[first],
            end: self.weeks[last],
        })
    }

    pub fn cells(&self) -> Vec<WeekCell> {
        self.weeks
            .iter()
            .enumerate()
            .map(|(index, week)| WeekCell {
                index,
                start: *week,
                end: week_end(*week),
                selected: self.is_selected(*week),
                consecutive: self.is_consecutive(*week),
                edge: self.is_edge(*week),
                first_selected: self.is_first_selected(*week),
            })
            .collect()
    }
}

/// Last day of the week starting at `week`.
pub fn week_end(week: NaiveDate) -> NaiveDate {
    week.checked_add_days(Days::new(WEEK_SPAN_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// `count` consecutive week-start dates beginning at `start`.
pub fn weekly_sequence(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start
        .iter_weeks()
        .take(count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weeks() -> Vec<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .map(|start| weekly_sequence(start, 4))
            .unwrap_or_default()
    }

    #[test]
    fn neighbours_of_single_week_are_consecutive() {
        let weeks = weeks();
        let selected = [weeks[1]];
        let selection = WeekSelection::new(&weeks, &selected);
        assert!(selection.is_consecutive(weeks[0]));
        assert!(selection.is_consecutive(weeks[2]));
        assert!(!selection.is_consecutive(weeks[3]));
        assert!(!selection.is_consecutive(weeks[1]));
    }

    #[test]
    fn edges_and_membership() {
        let weeks = weeks();
        let selected = [weeks[0], weeks[1], weeks[2]];
        let selection = WeekSelection::new(&weeks, &selected);
        assert!(selection.is_edge(weeks[0]));
        assert!(selection.is_edge(weeks[2]));
        assert!(!selection.is_edge(weeks[1]));
        assert!(selection.is_selected(weeks[1]));
        assert!(!selection.is_selected(weeks[3]));
        assert!(selection.is_consecutive(weeks[3]));
        assert!(selection.is_first_selected(weeks[0]));
    }

    #[test]
    fn gaps_break_contiguity() {
        let weeks = weeks();
        let selected = [weeks[0], weeks[2]];
        let selection = WeekSelection::new(&weeks, &selected);
        assert!(!selection.is_contiguous());
        assert_eq!(selection.range(), None);

        let selected = [weeks[1], weeks[2]];
        let selection = WeekSelection::new(&weeks, &selected);
        assert_eq!(
            selection.range(),
            Some(WeekRange {
                start: weeks[1],
                end: weeks[2]
            })
        );
    }

    #[test]
    fn unordered_selection_uses_sequence_bounds() {
        let weeks = weeks();
        let selected = [weeks[2], weeks[1], weeks[3]];
        let selection = WeekSelection::new(&weeks, &selected);
        assert!(selection.is_contiguous());
        assert_eq!(
            selection.range(),
            Some(WeekRange {
                start: weeks[1],
                end: weeks[3]
            })
        );
        assert!(selection.is_consecutive(weeks[0]));
        assert!(!selection.is_consecutive(weeks[1]));
        assert!(!selection.is_consecutive(weeks[2]));
        assert!(selection.is_edge(weeks[2]));
        assert!(selection.is_edge(weeks[3]));
        assert!(!selection.is_edge(weeks[1]));
        assert!(selection.is_first_selected(weeks[2]));
    }

    #[test]
    fn empty_selection_has_no_consecutive_weeks() {
        let weeks = weeks();
        let selection = WeekSelection::new(&weeks, &[]);
        assert!(weeks.iter().all(|week| !selection.is_consecutive(*week)));
        assert!(selection.is_contiguous());
        assert_eq!(selection.range(), None);
    }

    #[test]
    fn range_validation() {
        let weeks = weeks();
        assert!(WeekRange::new(weeks[0], weeks[2], &weeks).is_ok());
        assert_eq!(
            WeekRange::new(weeks[2], weeks[0], &weeks),
            Err(WeekError::Inverted {
                start: weeks[2],
                end: weeks[0]
            })
        );
        let stray = week_end(weeks[0]);
        assert_eq!(
            WeekRange::new(stray, weeks[2], &weeks),
            Err(WeekError::NotAvailable(stray))
        );
        let range = WeekRange::new(weeks[1], weeks[3], &weeks).unwrap();
        assert_eq!(range.weeks(&weeks).len(), 3);
    }

    #[test]
    fn cells_carry_week_end() {
        let weeks = weeks();
        let selected = [weeks[1]];
        let cells = WeekSelection::new(&weeks, &selected).cells();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].end, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert!(cells[1].selected && cells[1].edge && cells[1].first_selected);
        assert!(cells[2].consecutive);
    }
}
