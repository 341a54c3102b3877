//! Reactive-scope and region analysis.
//!
//! Groups co-dependent derived bindings declared in the same lexical block
//! into regions. Each region compiles to one memo returning a tuple of its
//! fields. Grouping uses the dependency-overlap rule: two derived values
//! land in the same region iff they share at least one signal/memo
//! dependency (transitively, within the block).
//!
//! A second family of regions folds branch-assigned `let`s read from JSX
//! into a memo carrying the declaration and its branching statement.

use fict_carton::{FxHashMap, FxHashSet, Span};

use crate::binder::WriteFact;
use crate::hir::*;

/// Infer regions and annotate bindings with their membership.
pub fn infer_regions(
    bindings: &mut [BindingRecord],
    functions: &[HirFunction],
    writes: &[WriteFact],
) -> Vec<Region> {
    let mut regions = Vec::new();
    group_derived(bindings, &mut regions);
    fold_branch_lets(bindings, functions, writes, &mut regions);
    regions
}

/// Dependency-overlap grouping of derived declarations per block.
fn group_derived(bindings: &mut [BindingRecord], regions: &mut Vec<Region>) {
    // candidates: memoizable derived values, excluding explicit $memo
    // wrappers (their identity is user-visible) and region-ineligible kinds
    let mut by_block: FxHashMap<BlockId, Vec<BindingId>> = FxHashMap::default();
    for binding in bindings.iter() {
        // module-level derived values always memoize individually
        if binding.function == FunctionId::MODULE {
            continue;
        }
        if binding.is_explicit_memo
            || binding.is_state_macro
            || binding.is_store
            || binding.mutable
            || binding.alias_of.is_some()
            || binding.destructured_from.is_some()
            || binding.deps.is_empty()
            || !binding.init_pure
            || binding.init.is_none()
        {
            continue;
        }
        by_block.entry(binding.block).or_default().push(binding.id);
    }

    let mut blocks: Vec<_> = by_block.into_iter().collect();
    blocks.sort_by_key(|(block, _)| block.index());

    for (block, members) in blocks {
        if members.len() < 2 {
            continue;
        }
        // union-find over members keyed by shared dependencies
        let mut parent: FxHashMap<BindingId, BindingId> =
            members.iter().map(|&m| (m, m)).collect();

        fn find(parent: &mut FxHashMap<BindingId, BindingId>, x: BindingId) -> BindingId {
            let p = parent[&x];
            if p == x {
                return x;
            }
            let root = find(parent, p);
            parent.insert(x, root);
            root
        }

        let mut dep_owner: FxHashMap<BindingId, BindingId> = FxHashMap::default();
        for &member in &members {
            for dep in &bindings[member.index()].deps {
                match dep_owner.get(dep) {
                    Some(&owner) => {
                        let a = find(&mut parent, owner);
                        let b = find(&mut parent, member);
                        if a != b {
                            parent.insert(a, b);
                        }
                    }
                    None => {
                        dep_owner.insert(*dep, member);
                    }
                }
            }
        }

        let mut groups: FxHashMap<BindingId, Vec<BindingId>> = FxHashMap::default();
        for &member in &members {
            let root = find(&mut parent, member);
            groups.entry(root).or_default().push(member);
        }

        let mut grouped: Vec<Vec<BindingId>> = groups
            .into_values()
            .filter(|group| group.len() >= 2)
            .collect();
        // declaration order inside each group, groups by first member
        for group in &mut grouped {
            group.sort();
        }
        grouped.sort_by_key(|group| group[0]);

        for fields in grouped {
            let id = RegionId::new(regions.len() as u32);
            let function = bindings[fields[0].index()].function;
            for &field in &fields {
                bindings[field.index()].region = Some(id);
            }
            regions.push(Region {
                id,
                function,
                block,
                fields,
                body: RegionBody::DerivedGroup,
            });
        }
    }
}

/// `let x; if (c) x = a; else x = b;` read from JSX becomes a one-field
/// region whose memo body carries the declaration and the branch.
fn fold_branch_lets(
    bindings: &mut [BindingRecord],
    functions: &[HirFunction],
    writes: &[WriteFact],
    regions: &mut Vec<Region>,
) {
    let mut write_branches: FxHashMap<BindingId, FxHashSet<Option<u32>>> = FxHashMap::default();
    let mut branch_spans: FxHashMap<BindingId, Span> = FxHashMap::default();
    for write in writes {
        write_branches
            .entry(write.binding)
            .or_default()
            .insert(write.branch.map(|s| s.start));
        if let Some(span) = write.branch {
            branch_spans.insert(write.binding, span);
        }
    }

    for index in 0..bindings.len() {
        let binding = &bindings[index];
        if !binding.mutable
            || binding.region.is_some()
            || binding.is_state_macro
            || binding.is_store
            || binding.destructured_from.is_some()
        {
            continue;
        }
        if !functions[binding.function.index()].is_reactive_scope() {
            continue;
        }
        if !binding
            .profile
            .intersects(UseProfile::JSX_CHILD | UseProfile::JSX_ATTR)
        {
            continue;
        }
        // all writes inside branches of a single statement
        let Some(branches) = write_branches.get(&binding.id) else {
            continue;
        };
        if branches.len() != 1 || branches.contains(&None) {
            continue;
        }
        let Some(&branch_span) = branch_spans.get(&binding.id) else {
            continue;
        };
        // the value must depend on something reactive, directly or through
        // the branch assignments; conservative: require any reactive dep
        // recorded, or accept and let the memo track nothing
        let id = RegionId::new(regions.len() as u32);
        let binding = &mut bindings[index];
        binding.region = Some(id);
        regions.push(Region {
            id,
            function: binding.function,
            block: binding.block,
            fields: vec![binding.id],
            body: RegionBody::Branch { branch_span },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;

    fn derived(id: u32, block: u32, deps: &[u32]) -> BindingRecord {
        BindingRecord {
            id: BindingId::new(id),
            name: CompactString::new(format!("d{id}")),
            span: Span::new(id * 10, id * 10 + 2),
            function: FunctionId::new(1),
            block: BlockId::new(block),
            decl_form: DeclForm::Single,
            mutable: false,
            kind: ReactiveKind::Plain,
            profile: UseProfile::READ,
            read_count: 1,
            is_state_macro: false,
            is_explicit_memo: false,
            is_store: false,
            alias_of: None,
            destructured_from: None,
            destructure_key: None,
            prop_path: None,
            deps: deps.iter().map(|&d| BindingId::new(d)).collect(),
            init_pure: true,
            init: Some(fict_relief::ast::Expr::Null(Span::STUB)),
            region: None,
        }
    }

    #[test]
    fn test_overlapping_deps_group() {
        // d1 and d2 share dep 0; d3 depends on 9 only
        let mut bindings = vec![derived(1, 5, &[0]), derived(2, 5, &[0, 8]), derived(3, 5, &[9])];
        let functions = vec![HirFunction {
            id: FunctionId::MODULE,
            parent: None,
            name: None,
            kind: FunctionKind::Module,
            is_async: false,
            span: Span::STUB,
            entry_block: BlockId::new(0),
            bindings: vec![],
            has_return: false,
            has_jsx_return: false,
        }];
        let regions = infer_regions(&mut bindings, &functions, &[]);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].fields.len(), 2);
        assert!(bindings[0].region.is_some());
        assert!(bindings[1].region.is_some());
        assert!(bindings[2].region.is_none());
    }

    #[test]
    fn test_different_blocks_do_not_group() {
        let mut bindings = vec![derived(1, 5, &[0]), derived(2, 6, &[0])];
        let functions = vec![HirFunction {
            id: FunctionId::MODULE,
            parent: None,
            name: None,
            kind: FunctionKind::Module,
            is_async: false,
            span: Span::STUB,
            entry_block: BlockId::new(0),
            bindings: vec![],
            has_return: false,
            has_jsx_return: false,
        }];
        let regions = infer_regions(&mut bindings, &functions, &[]);
        assert!(regions.is_empty());
    }
}
