//! Filter domain models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{RecipeError, Result};
use crate::recipe::Difficulty;

/// An inclusive numeric range where either bound may be open.
///
/// The two bounds form one logical filter: it is active when at least one
/// bound is set, and removing it clears both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RangeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl RangeFilter {
    pub fn new(min: Option<u32>, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn between(min: u32, max: u32) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub fn at_least(min: u32) -> Self {
        Self::new(Some(min), None)
    }

    pub fn at_most(max: u32) -> Self {
        Self::new(None, Some(max))
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: u32) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Every named field of [`FilterState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Cuisine,
    Difficulty,
    DietTypes,
    PrepTime,
    CookTime,
    Servings,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Cuisine,
        FilterField::Difficulty,
        FilterField::DietTypes,
        FilterField::PrepTime,
        FilterField::CookTime,
        FilterField::Servings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cuisine => "cuisine",
            Self::Difficulty => "difficulty",
            Self::DietTypes => "diet_types",
            Self::PrepTime => "prep_time",
            Self::CookTime => "cook_time",
            Self::Servings => "servings",
        }
    }

    /// Query parameter names this field is written under.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            Self::Cuisine => &["cuisine"],
            Self::Difficulty => &["difficulty"],
            Self::DietTypes => &["diet_types"],
            Self::PrepTime => &["min_prep_time", "max_prep_time"],
            Self::CookTime => &["min_cook_time", "max_cook_time"],
            Self::Servings => &["min_servings", "max_servings"],
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Self::PrepTime | Self::CookTime | Self::Servings)
    }

    /// The set-valued view of this field, if it has one.
    pub fn as_set_field(&self) -> Option<SetField> {
        match self {
            Self::DietTypes => Some(SetField::DietTypes),
            _ => None,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterField {
    type Err = RecipeError;

    /// Accepts the field name or any of its parameter names, so a badge for
    /// `max_prep_time` resolves to the whole prep time range.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s || field.param_names().contains(&s))
            .ok_or_else(|| RecipeError::validation(format!("unknown filter field '{}'", s)))
    }
}

/// Filter fields holding a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetField {
    DietTypes,
}

impl From<SetField> for FilterField {
    fn from(field: SetField) -> Self {
        match field {
            SetField::DietTypes => FilterField::DietTypes,
        }
    }
}

/// Structured search constraints.
///
/// A field is active when a scalar is present (and not blank), when a range
/// has at least one bound, or when a set has at least one member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub diet_types: BTreeSet<String>,
    #[serde(default)]
    pub prep_time: RangeFilter,
    #[serde(default)]
    pub cook_time: RangeFilter,
    #[serde(default)]
    pub servings: RangeFilter,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, field: FilterField) -> bool {
        match field {
            FilterField::Cuisine => self
                .cuisine
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty()),
            FilterField::Difficulty => self.difficulty.is_some(),
            FilterField::DietTypes => !self.diet_types.is_empty(),
            FilterField::PrepTime => self.prep_time.is_active(),
            FilterField::CookTime => self.cook_time.is_active(),
            FilterField::Servings => self.servings.is_active(),
        }
    }

    pub fn has_active_filters(&self) -> bool {
        FilterField::ALL.iter().any(|f| self.is_active(*f))
    }

    /// Number of active logical filters. A range counts once; a set counts
    /// once per member.
    pub fn active_filter_count(&self) -> usize {
        FilterField::ALL
            .iter()
            .filter(|f| self.is_active(**f))
            .map(|f| match f {
                FilterField::DietTypes => self.diet_types.len(),
                _ => 1,
            })
            .sum()
    }

    pub fn active_fields(&self) -> Vec<FilterField> {
        FilterField::ALL
            .into_iter()
            .filter(|f| self.is_active(*f))
            .collect()
    }

    /// Shallow merge: every field present in `patch` replaces the current one.
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(cuisine) = patch.cuisine {
            self.cuisine = cuisine;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(diet_types) = patch.diet_types {
            self.diet_types = diet_types;
        }
        if let Some(range) = patch.prep_time {
            self.prep_time = range;
        }
        if let Some(range) = patch.cook_time {
            self.cook_time = range;
        }
        if let Some(range) = patch.servings {
            self.servings = range;
        }
    }

    /// Trims text values and drops blank ones, so equivalent filters compare
    /// equal. Returns true if anything was rewritten.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();
        self.cuisine = self
            .cuisine
            .take()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.diet_types = std::mem::take(&mut self.diet_types)
            .into_iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        *self != before
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Clears a whole field. For ranges both bounds go together.
    pub fn clear_field(&mut self, field: FilterField) {
        match field {
            FilterField::Cuisine => self.cuisine = None,
            FilterField::Difficulty => self.difficulty = None,
            FilterField::DietTypes => self.diet_types.clear(),
            FilterField::PrepTime => self.prep_time = RangeFilter::default(),
            FilterField::CookTime => self.cook_time = RangeFilter::default(),
            FilterField::Servings => self.servings = RangeFilter::default(),
        }
    }

    pub fn set_members(&self, field: SetField) -> &BTreeSet<String> {
        match field {
            SetField::DietTypes => &self.diet_types,
        }
    }

    fn set_members_mut(&mut self, field: SetField) -> &mut BTreeSet<String> {
        match field {
            SetField::DietTypes => &mut self.diet_types,
        }
    }

    /// Adds one member to a set field. Returns false if it was already there.
    pub fn add_set_member(&mut self, field: SetField, value: impl Into<String>) -> bool {
        self.set_members_mut(field).insert(value.into())
    }

    /// Removes exactly `value` from a set field, leaving other members.
    /// Returns false if it was not a member.
    pub fn remove_set_member(&mut self, field: SetField, value: &str) -> bool {
        self.set_members_mut(field).remove(value)
    }

    /// Single entry point for badge removal: a value on a set field removes
    /// that member, anything else clears the field.
    pub fn remove_filter(&mut self, field: FilterField, value: Option<&str>) {
        match (field.as_set_field(), value) {
            (Some(set_field), Some(value)) => {
                self.remove_set_member(set_field, value);
            }
            _ => self.clear_field(field),
        }
    }
}

/// A partial filter update.
///
/// An outer `None` leaves the field untouched; for scalar fields `Some(None)`
/// clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPatch {
    pub cuisine: Option<Option<String>>,
    pub difficulty: Option<Option<Difficulty>>,
    pub diet_types: Option<BTreeSet<String>>,
    pub prep_time: Option<RangeFilter>,
    pub cook_time: Option<RangeFilter>,
    pub servings: Option<RangeFilter>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cuisine(mut self, cuisine: Option<&str>) -> Self {
        self.cuisine = Some(cuisine.map(str::to_string));
        self
    }

    pub fn difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn diet_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.diet_types = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn prep_time(mut self, range: RangeFilter) -> Self {
        self.prep_time = Some(range);
        self
    }

    pub fn cook_time(mut self, range: RangeFilter) -> Self {
        self.cook_time = Some(range);
        self
    }

    pub fn servings(mut self, range: RangeFilter) -> Self {
        self.servings = Some(range);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_is_inactive() {
        let filters = FilterState {
            diet_types: BTreeSet::new(),
            ..Default::default()
        };
        assert!(!filters.has_active_filters());
        assert_eq!(filters.active_filter_count(), 0);
    }

    #[test]
    fn test_single_bound_range_is_active() {
        let filters = FilterState {
            cook_time: RangeFilter::at_most(20),
            ..Default::default()
        };
        assert!(filters.has_active_filters());
        assert_eq!(filters.active_fields(), vec![FilterField::CookTime]);
    }

    #[test]
    fn test_blank_cuisine_is_inactive() {
        let filters = FilterState {
            cuisine: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!filters.has_active_filters());
    }

    #[test]
    fn test_normalize_trims_and_drops_blanks() {
        let mut filters = FilterState::new();
        filters.merge(
            FilterPatch::new()
                .cuisine(Some(" thai "))
                .diet_types(["vegan", " ", " keto"]),
        );

        assert!(filters.normalize());
        assert_eq!(filters.cuisine.as_deref(), Some("thai"));
        assert_eq!(
            filters.diet_types.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["keto", "vegan"]
        );
        assert!(!filters.normalize());

        let blank = FilterState::new().normalized();
        let mut blank_cuisine = FilterState::new();
        blank_cuisine.merge(FilterPatch::new().cuisine(Some("  ")));
        assert_eq!(blank_cuisine.normalized(), blank);
    }

    #[test]
    fn test_active_filter_count_counts_set_members() {
        let mut filters = FilterState::new();
        filters.merge(
            FilterPatch::new()
                .cuisine(Some("italian"))
                .diet_types(["vegan", "gluten-free"])
                .prep_time(RangeFilter::between(10, 30)),
        );
        assert_eq!(filters.active_filter_count(), 4);
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut filters = FilterState::new();
        filters.merge(FilterPatch::new().cuisine(Some("thai")).difficulty(Some(Difficulty::Easy)));
        filters.merge(FilterPatch::new().difficulty(None));

        assert_eq!(filters.cuisine.as_deref(), Some("thai"));
        assert_eq!(filters.difficulty, None);
    }

    #[test]
    fn test_clear_range_clears_both_bounds() {
        let mut filters = FilterState {
            prep_time: RangeFilter::between(10, 30),
            ..Default::default()
        };
        filters.clear_field(FilterField::PrepTime);
        assert_eq!(filters.prep_time, RangeFilter::default());
    }

    #[test]
    fn test_remove_set_member_keeps_others() {
        let mut filters = FilterState::new();
        filters.add_set_member(SetField::DietTypes, "vegan");
        filters.add_set_member(SetField::DietTypes, "keto");

        assert!(filters.remove_set_member(SetField::DietTypes, "vegan"));
        assert!(!filters.remove_set_member(SetField::DietTypes, "vegan"));
        assert_eq!(
            filters.diet_types.iter().collect::<Vec<_>>(),
            vec![&"keto".to_string()]
        );
    }

    #[test]
    fn test_remove_filter_dispatches_on_field_kind() {
        let mut filters = FilterState::new();
        filters.merge(
            FilterPatch::new()
                .diet_types(["vegan", "keto"])
                .servings(RangeFilter::at_least(2)),
        );

        filters.remove_filter(FilterField::DietTypes, Some("keto"));
        assert_eq!(filters.diet_types.len(), 1);

        filters.remove_filter(FilterField::Servings, None);
        assert!(!filters.servings.is_active());

        filters.remove_filter(FilterField::DietTypes, None);
        assert!(filters.diet_types.is_empty());
    }

    #[test]
    fn test_field_from_param_name() {
        assert_eq!("max_prep_time".parse::<FilterField>().unwrap(), FilterField::PrepTime);
        assert_eq!("cuisine".parse::<FilterField>().unwrap(), FilterField::Cuisine);
        assert!("colour".parse::<FilterField>().is_err());
    }

    #[test]
    fn test_range_contains() {
        let range = RangeFilter::between(10, 30);
        assert!(range.contains(10));
        assert!(range.contains(30));
        assert!(!range.contains(31));
        assert!(RangeFilter::default().contains(1000));
    }
}
