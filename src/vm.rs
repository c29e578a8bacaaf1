//! View-model for the colony table: sort order, fertility filter, breeding
//! eligibility, and cell derivation. Pure so it can be unit-tested on the
//! host; the DOM layer in `render` only applies what is computed here.

use std::cmp::Ordering;

use crate::dto::{TorbRecord, GENE_COLUMNS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDir {
    Ascending,
    Descending,
}

impl SortDir {
    pub fn flipped(self) -> SortDir {
        match self {
            SortDir::Ascending => SortDir::Descending,
            SortDir::Descending => SortDir::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDir::Ascending => "▲",
            SortDir::Descending => "▼",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub col: usize,
    pub dir: SortDir,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FertilityFilter {
    #[default]
    All,
    FertileOnly,
    InfertileOnly,
}

impl FertilityFilter {
    pub fn next(self) -> FertilityFilter {
        match self {
            FertilityFilter::All => FertilityFilter::FertileOnly,
            FertilityFilter::FertileOnly => FertilityFilter::InfertileOnly,
            FertilityFilter::InfertileOnly => FertilityFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FertilityFilter::All => "Showing: All",
            FertilityFilter::FertileOnly => "Showing: Fertile",
            FertilityFilter::InfertileOnly => "Showing: Infertile",
        }
    }

    pub fn matches(self, fertile: bool) -> bool {
        match self {
            FertilityFilter::All => true,
            FertilityFilter::FertileOnly => fertile,
            FertilityFilter::InfertileOnly => !fertile,
        }
    }
}

/// Per-page view state: which column is sorted which way, and which
/// fertility mode is active. Reset by a page reload.
#[derive(Debug, Default)]
pub struct ViewState {
    pub sort: Option<SortSpec>,
    pub filter: FertilityFilter,
}

impl ViewState {
    /// A header click: flips direction on the active column, sorts a new
    /// column ascending. Returns the sort to apply.
    pub fn toggle_sort(&mut self, col: usize) -> SortSpec {
        let spec = match self.sort {
            Some(active) if active.col == col => SortSpec {
                col,
                dir: active.dir.flipped(),
            },
            _ => SortSpec {
                col,
                dir: SortDir::Ascending,
            },
        };
        self.sort = Some(spec);
        spec
    }

    pub fn cycle_filter(&mut self) -> FertilityFilter {
        self.filter = self.filter.next();
        self.filter
    }
}

/// Checked/fertile snapshot of one table row.
#[derive(Clone, Copy, Debug)]
pub struct RowSelection {
    pub checked: bool,
    pub fertile: bool,
}

/// Breeding is allowed iff exactly two rows are checked and both are fertile.
pub fn breed_enabled(rows: &[RowSelection]) -> bool {
    let picked: Vec<&RowSelection> = rows.iter().filter(|row| row.checked).collect();
    picked.len() == 2 && picked.iter().all(|row| row.fertile)
}

/// Cell comparison: numeric when both sides parse as numbers, otherwise
/// case-insensitive lexicographic.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(&b),
    }
}

/// Stable sort permutation over one column's cell texts. The caller
/// re-appends its row elements in this order, so checkbox state survives.
pub fn sorted_order(keys: &[String], dir: SortDir) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&i, &j| {
        let ord = compare_cells(&keys[i], &keys[j]);
        match dir {
            SortDir::Ascending => ord,
            SortDir::Descending => ord.reverse(),
        }
    });
    order
}

/// Text cells for one record, in display order after the selection checkbox:
/// private ID, generation, name, health, one cell per gene, action. The
/// status cell is icon-only and built by the renderer.
pub fn torb_cells(torb: &TorbRecord) -> Vec<String> {
    let mut cells = vec![
        torb.private_id.to_string(),
        torb.generation.to_string(),
        torb.name.clone(),
        format!("{}/{}", torb.hp, torb.max_hp),
    ];
    for gene in GENE_COLUMNS {
        let alleles = torb
            .genes
            .get(gene)
            .map(|pair| format!("{} | {}", pair[0], pair[1]))
            .unwrap_or_default();
        cells.push(alleles);
    }
    cells.push(torb.action_desc.clone());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(checked: bool, fertile: bool) -> RowSelection {
        RowSelection { checked, fertile }
    }

    #[test]
    fn breed_needs_exactly_two_checked_rows() {
        assert!(!breed_enabled(&[]));
        assert!(!breed_enabled(&[row(true, true)]));
        assert!(breed_enabled(&[row(true, true), row(true, true), row(false, false)]));
        assert!(!breed_enabled(&[row(true, true), row(true, true), row(true, true)]));
    }

    #[test]
    fn breed_rejects_any_infertile_member() {
        assert!(!breed_enabled(&[row(true, true), row(true, false)]));
        assert!(!breed_enabled(&[row(true, false), row(true, false)]));
        // Unchecked infertile rows do not matter.
        assert!(breed_enabled(&[row(true, true), row(true, true), row(false, false)]));
    }

    #[test]
    fn numeric_looking_cells_compare_numerically() {
        assert_eq!(compare_cells("9", "10"), Ordering::Less);
        assert_eq!(compare_cells("10", "9"), Ordering::Greater);
        assert_eq!(compare_cells(" 2.5", "2.50 "), Ordering::Equal);
    }

    #[test]
    fn other_cells_compare_lexicographically_case_insensitive() {
        assert_eq!(compare_cells("Apple", "banana"), Ordering::Less);
        assert_eq!(compare_cells("Zeta", "alpha"), Ordering::Greater);
        assert_eq!(compare_cells("Bilbo", "bilbo"), Ordering::Equal);
        // One numeric side is not enough; "10" sorts as text against "5/5".
        assert_eq!(compare_cells("10", "5/5"), Ordering::Less);
    }

    #[test]
    fn sorted_order_respects_direction() {
        let keys: Vec<String> = ["3", "1", "2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sorted_order(&keys, SortDir::Ascending), vec![1, 2, 0]);
        assert_eq!(sorted_order(&keys, SortDir::Descending), vec![0, 2, 1]);
    }

    #[test]
    fn sorted_order_is_stable_for_equal_keys() {
        let keys: Vec<String> = ["b", "a", "B", "A"].iter().map(|s| s.to_string()).collect();
        assert_eq!(sorted_order(&keys, SortDir::Ascending), vec![1, 3, 0, 2]);
        assert_eq!(sorted_order(&keys, SortDir::Descending), vec![0, 2, 1, 3]);
    }

    #[test]
    fn toggling_same_column_flips_direction() {
        let mut view = ViewState::default();
        let first = view.toggle_sort(2);
        assert_eq!(first, SortSpec { col: 2, dir: SortDir::Ascending });
        let second = view.toggle_sort(2);
        assert_eq!(second, SortSpec { col: 2, dir: SortDir::Descending });
        let third = view.toggle_sort(2);
        assert_eq!(third, SortSpec { col: 2, dir: SortDir::Ascending });
    }

    #[test]
    fn switching_column_resets_to_ascending() {
        let mut view = ViewState::default();
        view.toggle_sort(1);
        view.toggle_sort(1);
        let spec = view.toggle_sort(4);
        assert_eq!(spec, SortSpec { col: 4, dir: SortDir::Ascending });
    }

    #[test]
    fn descending_order_reverses_orderable_data() {
        let keys: Vec<String> = ["1", "2", "3"].iter().map(|s| s.to_string()).collect();
        let asc = sorted_order(&keys, SortDir::Ascending);
        let mut desc = sorted_order(&keys, SortDir::Descending);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn filter_cycle_wraps_through_all_modes() {
        let mut view = ViewState::default();
        assert_eq!(view.filter, FertilityFilter::All);
        assert_eq!(view.cycle_filter(), FertilityFilter::FertileOnly);
        assert_eq!(view.cycle_filter(), FertilityFilter::InfertileOnly);
        assert_eq!(view.cycle_filter(), FertilityFilter::All);
    }

    #[test]
    fn filter_modes_match_expected_rows() {
        assert!(FertilityFilter::All.matches(true));
        assert!(FertilityFilter::All.matches(false));
        assert!(FertilityFilter::FertileOnly.matches(true));
        assert!(!FertilityFilter::FertileOnly.matches(false));
        assert!(!FertilityFilter::InfertileOnly.matches(true));
        assert!(FertilityFilter::InfertileOnly.matches(false));
    }

    #[test]
    fn filter_labels_follow_mode() {
        assert_eq!(FertilityFilter::All.label(), "Showing: All");
        assert_eq!(FertilityFilter::FertileOnly.label(), "Showing: Fertile");
        assert_eq!(FertilityFilter::InfertileOnly.label(), "Showing: Infertile");
    }

    #[test]
    fn torb_cells_follow_column_layout() {
        let mut genes = HashMap::new();
        genes.insert("vitality".to_string(), ["5".to_string(), "7".to_string()]);
        genes.insert("agility".to_string(), ["6".to_string(), "1".to_string()]);

        let torb = TorbRecord {
            id: 7,
            private_id: 12,
            generation: 2,
            name: "Mira".to_string(),
            hp: 3,
            max_hp: 5,
            genes,
            action_desc: "⚔️ Soldiering".to_string(),
            status: "Alive<br>Fertile".to_string(),
            fertile: true,
        };

        let cells = torb_cells(&torb);
        assert_eq!(
            cells,
            vec![
                "12".to_string(),
                "2".to_string(),
                "Mira".to_string(),
                "3/5".to_string(),
                "5 | 7".to_string(),
                String::new(),
                "6 | 1".to_string(),
                String::new(),
                "⚔️ Soldiering".to_string(),
            ]
        );
    }
}
