//! Grouping of compiled patterns into independent join components.

use std::collections::HashMap;

use super::EncodedPattern;

/// Partition patterns into components connected by shared variable IDs,
/// directly or transitively. All-concrete patterns have no variables and
/// each form their own singleton group.
///
/// A component containing a pattern made impossible by an absent concrete
/// node is dropped whole: no pattern in it can contribute solutions, and
/// every pattern sharing a variable with it inherits that emptiness.
pub(crate) fn group_patterns(patterns: Vec<EncodedPattern>) -> Vec<Vec<EncodedPattern>> {
    let mut groups: Vec<Vec<EncodedPattern>> = Vec::new();
    let mut var_group: HashMap<u32, usize> = HashMap::new();

    for pattern in patterns {
        let mut targets: Vec<usize> = pattern
            .var_ids()
            .filter_map(|v| var_group.get(&v).copied())
            .collect();
        targets.sort_unstable();
        targets.dedup();

        let home = match targets.first() {
            None if pattern.var_ids().next().is_none() => {
                // Concrete singleton.
                groups.push(vec![pattern]);
                continue;
            }
            None => {
                groups.push(Vec::new());
                groups.len() - 1
            }
            Some(&first) => {
                // Merge every other connected group into the first.
                for &other in targets.iter().skip(1).rev() {
                    let moved = std::mem::take(&mut groups[other]);
                    for p in &moved {
                        for v in p.var_ids() {
                            var_group.insert(v, first);
                        }
                    }
                    groups[first].extend(moved);
                }
                first
            }
        };

        for v in pattern.var_ids() {
            var_group.insert(v, home);
        }
        groups[home].push(pattern);
    }

    groups
        .into_iter()
        .filter(|g| !g.is_empty() && !g.iter().any(|p| p.impossible))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FIRST_NODE_ID;

    fn pat(s: u32, p: u32, o: u32) -> EncodedPattern {
        EncodedPattern {
            s,
            p,
            o,
            estimate: 1,
            impossible: false,
        }
    }

    const N: u32 = FIRST_NODE_ID;

    #[test]
    fn shared_variable_connects_patterns() {
        // {?1 N ?2} {?2 N ?3} share ?2.
        let groups = group_patterns(vec![pat(1, N, 2), pat(2, N, 3)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn disjoint_variables_split_groups() {
        let groups = group_patterns(vec![pat(1, N, 2), pat(3, N, 4)]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 1);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn transitive_sharing_merges_groups() {
        // First two are disjoint until the third bridges ?2 and ?4.
        let groups = group_patterns(vec![pat(1, N, 2), pat(3, N, 4), pat(2, N, 4)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
    }

    #[test]
    fn concrete_patterns_are_singleton_groups() {
        let groups = group_patterns(vec![pat(N, N + 1, N + 2), pat(N, N + 1, N + 3)]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn impossible_pattern_poisons_its_component() {
        let mut poisoned = pat(0, N, 2);
        poisoned.impossible = true;
        // ?2 connects the poisoned pattern to the second; the third is
        // independent and survives.
        let groups = group_patterns(vec![poisoned, pat(2, N, 3), pat(4, N, 5)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], vec![pat(4, N, 5)]);
    }
}
