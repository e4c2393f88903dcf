use super::model::Task;
use std::collections::HashMap;

/// Parent-indexed view of the tasks of one section
///
/// Built once per section per cycle so that child and descendant lookups are
/// plain index walks instead of repeated scans over the task list.
/// A task whose parent is not in the section is treated as a root.
pub struct TaskForest<'a> {
    tasks: Vec<&'a Task>,
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl<'a> TaskForest<'a> {
    /// Build the forest, ordering roots and siblings by `(order, id)`
    pub fn build(mut tasks: Vec<&'a Task>) -> Self {
        tasks.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

        let index: HashMap<&str, usize> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); tasks.len()];

        for (i, task) in tasks.iter().enumerate() {
            let parent = task
                .parent_id
                .as_deref()
                .and_then(|p| index.get(p).copied())
                .filter(|&p| p != i);
            match parent {
                Some(p) => children[p].push(i),
                None => roots.push(i),
            }
        }

        Self {
            tasks,
            roots,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, i: usize) -> &'a Task {
        self.tasks[i]
    }

    /// Iterate over every task in the section
    pub fn tasks(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.tasks.iter().copied()
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn children(&self, i: usize) -> &[usize] {
        &self.children[i]
    }

    /// All descendants of `i` in pre-order, excluding `i` itself
    pub fn descendants(&self, i: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children[i].iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children[next].iter().rev().copied());
        }
        out
    }

    /// Every task in pre-order: each root followed by its subtree
    ///
    /// Parents always come before their children. Tasks caught in a parent
    /// cycle are not reachable from any root and are appended at the end.
    pub fn preorder(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.tasks.len());
        for &root in &self.roots {
            out.push(root);
            out.extend(self.descendants(root));
        }
        if out.len() < self.tasks.len() {
            let mut seen = vec![false; self.tasks.len()];
            for &i in &out {
                seen[i] = true;
            }
            out.extend((0..self.tasks.len()).filter(|&i| !seen[i]));
        }
        out
    }
}
