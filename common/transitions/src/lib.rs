//! Table-driven conditional updates for categorical attribute transitions.
//!
//! A `TransitionTable` declares, for each `(prev, next)` attribute transition,
//! which dependent fields must be rewritten. Each rewrite is guarded by the
//! field's expected prior value so that a value the user deliberately changed
//! is not silently reverted.

/// A guarded dependent-field override.
///
/// Fires only while the field still holds `prev_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct DependentFieldUpdate<K, V> {
    pub field: K,
    pub prev_value: V,
    pub next_value: V,
}

/// Overrides prescribed for one attribute transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRule<A, K, V> {
    pub prev_value: A,
    pub next_value: A,
    pub dependent_fields: Vec<DependentFieldUpdate<K, V>>,
}

/// Ordered list of transition rules; the first rule matching a `(prev, next)`
/// pair wins.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable<A, K, V> {
    rules: Vec<TransitionRule<A, K, V>>,
}

impl<A, K, V> TransitionTable<A, K, V>
where
    A: PartialEq,
    K: Copy,
    V: Clone + PartialEq,
{
    pub fn new(rules: Vec<TransitionRule<A, K, V>>) -> Self {
        Self {
            rules,
        }
    }

    /// Dependent-field updates for the `prev` -> `next` transition.
    ///
    /// `current_value` reads a field's current effective value; an override
    /// whose expected prior value no longer matches is skipped. An unlisted
    /// transition yields no updates.
    pub fn updates<F>(&self, prev: &A, next: &A, current_value: F) -> Vec<(K, V)>
    where
        F: Fn(&K) -> Option<V>,
    {
        let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.prev_value == *prev && rule.next_value == *next)
        else {
            return vec![];
        };

        rule.dependent_fields
            .iter()
            .filter_map(|dependent| match current_value(&dependent.field) {
                Some(value) if value == dependent.prev_value => {
                    Some((dependent.field, dependent.next_value.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod transition_table_tests {
    use super::{DependentFieldUpdate, TransitionRule, TransitionTable};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Gear {
        Park,
        Drive,
        Reverse,
    }

    fn table() -> TransitionTable<Gear, &'static str, &'static str> {
        TransitionTable::new(vec![
            TransitionRule {
                prev_value: Gear::Park,
                next_value: Gear::Drive,
                dependent_fields: vec![
                    DependentFieldUpdate {
                        field: "brake",
                        prev_value: "engaged",
                        next_value: "released",
                    },
                    DependentFieldUpdate {
                        field: "camera",
                        prev_value: "rear",
                        next_value: "off",
                    },
                ],
            },
            TransitionRule {
                prev_value: Gear::Drive,
                next_value: Gear::Reverse,
                dependent_fields: vec![],
            },
        ])
    }

    #[test]
    fn applies_overrides_when_guards_hold() {
        // given
        let table = table();

        // when
        let updates = table.updates(&Gear::Park, &Gear::Drive, |field| match *field {
            "brake" => Some("engaged"),
            "camera" => Some("rear"),
            _ => None,
        });

        // then
        assert_eq!(updates, vec![("brake", "released"), ("camera", "off")]);
    }

    #[test]
    fn skips_override_when_field_was_already_changed() {
        // given
        let table = table();

        // when
        let updates = table.updates(&Gear::Park, &Gear::Drive, |field| match *field {
            "brake" => Some("released"),
            "camera" => Some("rear"),
            _ => None,
        });

        // then
        assert_eq!(updates, vec![("camera", "off")]);
    }

    #[test]
    fn rule_without_dependent_fields_yields_nothing() {
        // given
        let table = table();

        // when
        let updates = table.updates(&Gear::Drive, &Gear::Reverse, |_| Some("anything"));

        // then
        assert!(updates.is_empty());
    }

    #[test]
    fn unlisted_transition_yields_nothing() {
        // given
        let table = table();

        // when
        let updates = table.updates(&Gear::Reverse, &Gear::Park, |_| Some("engaged"));

        // then
        assert!(updates.is_empty());
    }
}
