//! Evaluation ordering over the activated forms.
//!
//! An edge runs from producer to consumer wherever the consumer declares a
//! dependency on an activated producer. Kahn's algorithm orders the graph;
//! ties are broken by registration index so the order is deterministic.

use std::collections::{BTreeSet, HashMap};

use crate::engine::error::ConfigurationError;
use crate::engine::form::{LinkKind, TaxForm, producers};
use crate::models::FormId;

/// Orders `activated` so every form follows the forms it reads from.
///
/// `activated` must be in registration order.
///
/// # Errors
/// * [`ConfigurationError::UnresolvedDependency`] if a form has a `Required`
///   dependency on a form that is not activated.
/// * [`ConfigurationError::CyclicDependency`] naming one cycle if the graph
///   is not acyclic.
pub fn order<'f>(
    activated: &[&'f dyn TaxForm],
) -> Result<Vec<&'f dyn TaxForm>, ConfigurationError> {
    let count = activated.len();
    let index: HashMap<FormId, usize> = activated
        .iter()
        .enumerate()
        .map(|(position, form)| (form.id(), position))
        .collect();

    let mut successors = vec![BTreeSet::new(); count];
    let mut predecessors = vec![BTreeSet::new(); count];
    for (consumer, form) in activated.iter().enumerate() {
        for (producer, link) in producers(*form) {
            match index.get(&producer) {
                Some(&producer_index) => {
                    successors[producer_index].insert(consumer);
                    predecessors[consumer].insert(producer_index);
                }
                None if link == LinkKind::Required => {
                    return Err(ConfigurationError::UnresolvedDependency {
                        consumer: form.id(),
                        producer,
                    });
                }
                None => {}
            }
        }
    }

    let mut in_degree: Vec<usize> = predecessors.iter().map(BTreeSet::len).collect();
    let mut ready: BTreeSet<usize> = (0..count).filter(|&node| in_degree[node] == 0).collect();
    let mut ordered = Vec::with_capacity(count);

    while let Some(node) = ready.pop_first() {
        ordered.push(activated[node]);
        for &successor in &successors[node] {
            in_degree[successor] -= 1;
            if in_degree[successor] == 0 {
                ready.insert(successor);
            }
        }
    }

    if ordered.len() < count {
        return Err(ConfigurationError::CyclicDependency {
            cycle: find_cycle(activated, &predecessors, &in_degree),
        });
    }
    Ok(ordered)
}

/// Walks predecessors among the unordered nodes until one repeats.
///
/// Every unordered node keeps at least one unordered predecessor, so the walk
/// always closes a loop.
fn find_cycle(
    activated: &[&dyn TaxForm],
    predecessors: &[BTreeSet<usize>],
    in_degree: &[usize],
) -> Vec<FormId> {
    let Some(start) = (0..activated.len()).find(|&node| in_degree[node] > 0) else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut current = start;
    while let Some(&previous) = predecessors[current]
        .iter()
        .find(|&&node| in_degree[node] > 0)
    {
        if let Some(position) = path.iter().position(|&node| node == previous) {
            let mut cycle: Vec<FormId> = path[position..]
                .iter()
                .rev()
                .map(|&node| activated[node].id())
                .collect();
            let first = cycle[0];
            cycle.push(first);
            return cycle;
        }
        path.push(previous);
        current = previous;
    }
    path.iter().map(|&node| activated[node].id()).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::engine::context::FormContext;
    use crate::engine::error::EvaluationError;
    use crate::engine::form::{Dependency, SnapshotField};
    use crate::engine::parameters::Parameters;
    use crate::models::{LineItems, ReturnSnapshot};

    struct Node {
        id: FormId,
        dependencies: &'static [Dependency],
    }

    impl TaxForm for Node {
        fn id(&self) -> FormId {
            self.id
        }

        fn title(&self) -> &'static str {
            "Node"
        }

        fn activates(
            &self,
            _snapshot: &ReturnSnapshot,
            _params: &Parameters,
        ) -> bool {
            true
        }

        fn inputs(&self) -> &'static [SnapshotField] {
            &[]
        }

        fn dependencies(&self) -> &'static [Dependency] {
            self.dependencies
        }

        fn outputs(&self) -> &'static [&'static str] {
            &["line_1"]
        }

        fn evaluate(
            &self,
            _ctx: &mut FormContext<'_>,
        ) -> Result<LineItems, EvaluationError> {
            Ok(LineItems::new())
        }
    }

    fn ids(forms: &[&dyn TaxForm]) -> Vec<FormId> {
        forms.iter().map(|form| form.id()).collect()
    }

    #[test]
    fn producers_come_before_consumers() {
        const FROM_D: &[Dependency] = &[Dependency::required(FormId::ScheduleD, "line_1")];
        const FROM_8949: &[Dependency] = &[Dependency::conditional(FormId::Form8949, "line_1")];
        let form_1040 = Node {
            id: FormId::Form1040,
            dependencies: FROM_D,
        };
        let schedule_d = Node {
            id: FormId::ScheduleD,
            dependencies: FROM_8949,
        };
        let form_8949 = Node {
            id: FormId::Form8949,
            dependencies: &[],
        };

        let ordered = order(&[&form_1040, &schedule_d, &form_8949]).unwrap();

        assert_eq!(
            ids(&ordered),
            vec![FormId::Form8949, FormId::ScheduleD, FormId::Form1040]
        );
    }

    #[test]
    fn independent_forms_keep_registration_order() {
        let schedule_b = Node {
            id: FormId::ScheduleB,
            dependencies: &[],
        };
        let form_8949 = Node {
            id: FormId::Form8949,
            dependencies: &[],
        };

        let ordered = order(&[&schedule_b, &form_8949]).unwrap();

        assert_eq!(ids(&ordered), vec![FormId::ScheduleB, FormId::Form8949]);
    }

    #[test]
    fn inactive_conditional_producer_adds_no_edge() {
        const FROM_B: &[Dependency] = &[Dependency::conditional(FormId::ScheduleB, "line_1")];
        let agi = Node {
            id: FormId::AgiWorksheet,
            dependencies: FROM_B,
        };

        let ordered = order(&[&agi]).unwrap();

        assert_eq!(ids(&ordered), vec![FormId::AgiWorksheet]);
    }

    #[test]
    fn inactive_required_producer_is_unresolved() {
        const FROM_AGI: &[Dependency] = &[Dependency::required(FormId::AgiWorksheet, "line_1")];
        let schedule_a = Node {
            id: FormId::ScheduleA,
            dependencies: FROM_AGI,
        };

        assert_eq!(
            order(&[&schedule_a]).map(|forms| ids(&forms)),
            Err(ConfigurationError::UnresolvedDependency {
                consumer: FormId::ScheduleA,
                producer: FormId::AgiWorksheet,
            })
        );
    }

    #[test]
    fn two_form_cycle_is_named() {
        const FROM_D: &[Dependency] = &[Dependency::required(FormId::ScheduleD, "line_1")];
        const FROM_B: &[Dependency] = &[Dependency::optional(FormId::ScheduleB, "line_1")];
        let schedule_b = Node {
            id: FormId::ScheduleB,
            dependencies: FROM_D,
        };
        let schedule_d = Node {
            id: FormId::ScheduleD,
            dependencies: FROM_B,
        };

        let err = order(&[&schedule_b, &schedule_d]).map(|forms| ids(&forms));

        assert_eq!(
            err,
            Err(ConfigurationError::CyclicDependency {
                cycle: vec![FormId::ScheduleD, FormId::ScheduleB, FormId::ScheduleD],
            })
        );
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        const FROM_SELF: &[Dependency] = &[Dependency::required(FormId::Schedule1, "line_1")];
        let schedule_1 = Node {
            id: FormId::Schedule1,
            dependencies: FROM_SELF,
        };

        assert_eq!(
            order(&[&schedule_1]).map(|forms| ids(&forms)),
            Err(ConfigurationError::CyclicDependency {
                cycle: vec![FormId::Schedule1, FormId::Schedule1],
            })
        );
    }

    #[test]
    fn cycle_behind_acyclic_prefix_is_found() {
        const FROM_A: &[Dependency] = &[Dependency::required(FormId::ScheduleA, "line_1")];
        const FROM_2: &[Dependency] = &[
            Dependency::required(FormId::Form8949, "line_1"),
            Dependency::required(FormId::Schedule2, "line_1"),
        ];
        const FROM_3: &[Dependency] = &[Dependency::required(FormId::Schedule3, "line_1")];
        let form_8949 = Node {
            id: FormId::Form8949,
            dependencies: &[],
        };
        let schedule_a = Node {
            id: FormId::ScheduleA,
            dependencies: FROM_2,
        };
        let schedule_2 = Node {
            id: FormId::Schedule2,
            dependencies: FROM_3,
        };
        let schedule_3 = Node {
            id: FormId::Schedule3,
            dependencies: FROM_A,
        };

        let result = order(&[&form_8949, &schedule_a, &schedule_2, &schedule_3]);

        let Err(ConfigurationError::CyclicDependency { cycle }) = result.map(|forms| ids(&forms))
        else {
            panic!("expected a cycle");
        };
        assert_eq!(cycle.len(), 4);
        assert_eq!(cycle.first(), cycle.last());
        assert!(!cycle.contains(&FormId::Form8949));
    }
}
