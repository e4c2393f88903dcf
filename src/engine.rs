//! Propagation engine
//!
//! Walks projects, sections and task forests once per cycle and decides which
//! tasks carry the marker label. The walk starts from the labels as fetched and
//! recomputes every managed task top-down; only the net difference ends up in
//! the change set, so running a cycle twice on the same data changes nothing
//! the second time.
//!
//! Per section the order is:
//! 1. resolve header directives for every task of the section
//! 2. decide the marker for each root from its nearest declared disposition
//! 3. pass the marker down from each holder to its children
//! 4. withhold the marker from time-suppressed tasks and their subtrees

use crate::classification::{ClassificationStore, RecordKind};
use crate::commit::ChangeSet;
use crate::disposition::{Disposition, DispositionCode, Markers, NodeKind};
use crate::header::{self, HeaderDirective};
use crate::recurring::EndOfDayShift;
use crate::suppression::SuppressionRules;
use crate::tasks::{Project, Section, Snapshot, Task, TaskForest};
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

/// Default name of the marker label
pub const DEFAULT_LABEL: &str = "next_action";

/// Everything the engine needs to know about the user's conventions
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub markers: Markers,
    /// Name of the marker label
    pub label: String,
    /// Disposition of the inbox project; `None` leaves the inbox alone
    pub inbox: Option<Disposition>,
    pub suppression: SuppressionRules,
    /// Move overdue daily tasks back to today before this hour
    pub end_of_day: Option<EndOfDayShift>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            markers: Markers::default(),
            label: DEFAULT_LABEL.to_string(),
            inbox: None,
            suppression: SuppressionRules::default(),
            end_of_day: None,
        }
    }
}

/// Result of one propagation walk
#[derive(Debug)]
pub struct Outcome {
    /// Commands to submit
    pub changes: ChangeSet,
    /// Tasks carrying the marker once the changes are applied
    pub marked: usize,
    /// Malformed or ambiguous directives seen during the walk
    pub warnings: usize,
}

/// Run one propagation walk over `snapshot`
///
/// The store is updated in place with the dispositions, parent types and due
/// dates seen in this cycle. Nothing is sent anywhere; the caller commits the
/// returned change set.
///
/// # Arguments
/// * `settings` - Marker characters, label name and optional features
/// * `snapshot` - Projects, sections and tasks fetched this cycle
/// * `store` - Classification state from the previous cycle
/// * `now` - Current local time, used for suppression and the end-of-day shift
pub fn propagate(
    settings: &EngineSettings,
    snapshot: &Snapshot,
    store: &mut ClassificationStore,
    now: NaiveDateTime,
) -> Outcome {
    let mut walk = Walk {
        settings,
        store,
        changes: ChangeSet::new(),
        marked: HashMap::new(),
        managed: HashSet::new(),
        warnings: 0,
        now,
    };

    for project in snapshot.ordered_projects() {
        if project.is_inbox && settings.inbox.is_none() {
            tracing::debug!("Skipping inbox project '{}'", project.name);
            continue;
        }
        walk.project(snapshot, project);
    }

    walk.finish(snapshot)
}

/// Dispositions of the containers around one section
#[derive(Debug, Clone, Copy)]
struct Containers {
    project: DispositionCode,
    section: DispositionCode,
}

impl Containers {
    /// How a root relates to the roots before it; its own marker comes first
    fn root_level(&self, root: DispositionCode) -> Disposition {
        Disposition::nearest([root.own(), self.section.own(), self.project.slot(1)])
    }

    /// How a root passes the marker to its children
    fn below_root(&self, root: DispositionCode) -> Disposition {
        Disposition::nearest([root.own(), self.section.slot(1), self.project.slot(2)])
    }
}

/// Read-only view of the section being walked
struct SectionView<'a, 'f> {
    forest: &'f TaskForest<'a>,
    contents: &'f HashMap<&'a str, String>,
}

impl<'a> SectionView<'a, '_> {
    /// Content after header directives were applied
    fn content(&self, i: usize) -> &str {
        let task = self.forest.task(i);
        self.contents
            .get(task.id.as_str())
            .map(String::as_str)
            .unwrap_or(&task.content)
    }

    /// Neither completed nor a header
    fn is_active(&self, i: usize) -> bool {
        !self.forest.task(i).is_completed && !header::is_header(self.content(i))
    }
}

struct Walk<'a, 's> {
    settings: &'s EngineSettings,
    store: &'s mut ClassificationStore,
    changes: ChangeSet,
    /// Working label membership, seeded from the fetched labels
    marked: HashMap<&'a str, bool>,
    /// Tasks whose marker was decided by the walk this cycle
    managed: HashSet<&'a str>,
    warnings: usize,
    now: NaiveDateTime,
}

impl<'a> Walk<'a, '_> {
    fn project(&mut self, snapshot: &'a Snapshot, project: &'a Project) {
        let tasks = snapshot.tasks_in_project(&project.id);
        for task in &tasks {
            self.marked
                .insert(task.id.as_str(), task.has_label(&self.settings.label));
        }

        let (code, directive) = match self.settings.inbox {
            Some(inbox) if project.is_inbox => (DispositionCode::uniform(inbox), None),
            _ => {
                let (directive, name) = header::scan(&project.name);
                if directive.is_some() {
                    tracing::debug!("Header directive on project '{}'", project.name);
                    self.changes.rename_project(&project.id, name);
                }
                (self.settings.markers.parse(name, NodeKind::Project), directive)
            }
        };

        if self
            .store
            .update_disposition(RecordKind::Project, &project.id, code)
        {
            tracing::debug!("Project '{}' changed to [{}]", project.name, code);
            self.reset(&tasks);
        }

        let mut section_found = false;
        for section in snapshot.sections_of(&project.id) {
            // A sequential project only works on its first section with work in it
            let blocked = code.own() == Disposition::Sequential && section_found;
            if self.section(snapshot, project, section, code, directive, blocked) {
                section_found = true;
            }
        }
    }

    /// Walk one section
    ///
    /// # Returns
    /// `true` if the section holds at least one active root
    fn section(
        &mut self,
        snapshot: &'a Snapshot,
        project: &'a Project,
        section: Option<&'a Section>,
        project_code: DispositionCode,
        project_directive: Option<HeaderDirective>,
        blocked: bool,
    ) -> bool {
        let section_id = section.map(|s| s.id.as_str());
        let tasks = snapshot.tasks_in_section(&project.id, section_id);

        let mut code = DispositionCode::UNSET;
        let mut directive = None;
        let mut board = false;
        if let Some(section) = section {
            let (own_directive, name) = header::scan(&section.name);
            if own_directive.is_some() {
                tracing::debug!("Header directive on section '{}'", section.name);
                self.changes.rename_section(&section.id, name);
            }
            directive = own_directive;
            board = header::disables_labelling(name);
            code = self.settings.markers.parse(name, NodeKind::Section);

            if self
                .store
                .update_disposition(RecordKind::Section, &section.id, code)
            {
                tracing::debug!("Section '{}' changed to [{}]", section.name, code);
                self.reset(&tasks);
            }
        }

        if tasks.is_empty() {
            return false;
        }

        let forest = TaskForest::build(tasks);
        let contents =
            header::resolve_section(&forest, directive.or(project_directive), &mut self.changes);
        self.track_recurring(&forest);

        if board {
            for task in forest.tasks() {
                self.strip_inert(task);
            }
            return false;
        }

        let view = SectionView {
            forest: &forest,
            contents: &contents,
        };
        let containers = Containers {
            project: project_code,
            section: code,
        };
        let active = self.roots(&view, containers, blocked);
        self.suppress(&view);
        active
    }

    fn roots(&mut self, view: &SectionView<'a, '_>, containers: Containers, blocked: bool) -> bool {
        let mut first_found = false;
        let mut active = false;

        for &root in view.forest.roots() {
            let task = view.forest.task(root);
            if !view.is_active(root) {
                self.make_inert(view, root);
                continue;
            }
            active = true;

            let own = self.classify(view, root);
            self.store.set_parent_type(&task.id, None);
            let holds = match containers.root_level(own) {
                Disposition::Sequential => !first_found,
                Disposition::Parallel => true,
                Disposition::Unset => {
                    tracing::debug!("Task '{}' is unclassified", view.content(root));
                    self.mark(task, false);
                    continue;
                }
            };
            first_found = true;

            let mode = containers.below_root(own);
            self.visit(view, root, holds && !blocked, mode);
        }

        active
    }

    /// Settle the marker on a managed task and pass it down
    ///
    /// # Arguments
    /// * `i` - Task index in the section forest
    /// * `holds` - Whether the marker reached this task from above
    /// * `mode` - How this task passes the marker to its children
    fn visit(&mut self, view: &SectionView<'a, '_>, i: usize, holds: bool, mode: Disposition) {
        let task = view.forest.task(i);
        self.managed.insert(task.id.as_str());

        let children = view.forest.children(i);
        let eligible: Vec<usize> = children
            .iter()
            .copied()
            .filter(|&c| view.is_active(c))
            .collect();

        for &c in &eligible {
            let child = view.forest.task(c);
            self.store
                .set_parent_type(&child.id, mode.is_set().then_some(mode));
        }

        let mut granted: HashSet<usize> = HashSet::new();
        if !holds || !mode.is_set() || eligible.is_empty() {
            self.mark(task, holds);
        } else {
            self.mark(task, false);
            match mode {
                Disposition::Sequential => {
                    granted.insert(eligible[0]);
                }
                _ => granted.extend(eligible.iter().copied()),
            }
        }

        for &c in children {
            if !view.is_active(c) {
                self.make_inert(view, c);
                continue;
            }
            let own = self.classify(view, c);
            let inherited = self.store.parent_type(&view.forest.task(c).id);
            let child_mode = Disposition::nearest([own.own(), inherited.unwrap_or_default()]);
            self.visit(view, c, granted.contains(&c), child_mode);
        }
    }

    /// Parse and store a task's own disposition
    ///
    /// A changed disposition resets the whole subtree below the task.
    fn classify(&mut self, view: &SectionView<'a, '_>, i: usize) -> DispositionCode {
        let task = view.forest.task(i);
        let code = self
            .settings
            .markers
            .parse(view.content(i), NodeKind::Task);

        if self.store.update_disposition(RecordKind::Task, &task.id, code) {
            tracing::debug!("Task '{}' changed to [{}]", view.content(i), code);
            for d in view.forest.descendants(i) {
                let descendant = view.forest.task(d);
                self.mark(descendant, false);
                self.store.set_parent_type(&descendant.id, None);
            }
        }
        code
    }

    /// Withhold the marker from suppressed tasks and their open descendants
    fn suppress(&mut self, view: &SectionView<'a, '_>) {
        let settings = self.settings;
        let rules = &settings.suppression;
        for i in view.forest.preorder() {
            let task = view.forest.task(i);
            if !self.managed.contains(task.id.as_str()) {
                continue;
            }

            let evaluation = rules.evaluate(view.content(i), task.due.as_ref(), self.now);
            for warning in &evaluation.warnings {
                tracing::warn!("Task '{}': {}", task.content, warning);
            }
            self.warnings += evaluation.warnings.len();

            if let Some(reason) = evaluation.suppression {
                tracing::debug!("Withholding label from '{}': {:?}", task.content, reason);
                self.mark(task, false);
                for d in view.forest.descendants(i) {
                    let descendant = view.forest.task(d);
                    if !descendant.is_completed {
                        self.mark(descendant, false);
                    }
                }
            }
        }
    }

    /// Record due dates of recurring roots and shift them after a late completion
    fn track_recurring(&mut self, forest: &TaskForest<'a>) {
        let Some(shift) = self.settings.end_of_day else {
            return;
        };

        for &i in forest.roots() {
            let task = forest.task(i);
            let Some(due) = task.due.as_ref().filter(|d| d.is_recurring) else {
                continue;
            };

            match self.store.due_date(&task.id) {
                None => tracing::debug!("New recurring task detected: '{}'", task.content),
                Some(stored) if stored == due.date => continue,
                Some(stored) => {
                    if let Some(today) = shift.shifted_due(stored, due, self.now) {
                        tracing::debug!("Moving due date of '{}' back to {}", task.content, today);
                        self.changes.move_due(&task.id, today, due.string.clone());
                    }
                }
            }
            self.store.set_due_date(&task.id, due.date);
        }
    }

    /// Strip a task and everything below it
    fn make_inert(&mut self, view: &SectionView<'a, '_>, i: usize) {
        self.strip_inert(view.forest.task(i));
        for d in view.forest.descendants(i) {
            self.strip_inert(view.forest.task(d));
        }
    }

    fn strip_inert(&mut self, task: &'a Task) {
        self.mark(task, false);
        self.store.set_parent_type(&task.id, None);
    }

    fn reset(&mut self, tasks: &[&'a Task]) {
        for task in tasks {
            self.mark(task, false);
            self.store.set_parent_type(&task.id, None);
        }
    }

    fn mark(&mut self, task: &'a Task, marked: bool) {
        self.marked.insert(task.id.as_str(), marked);
    }

    fn finish(mut self, snapshot: &'a Snapshot) -> Outcome {
        let mut marked = 0;
        for task in &snapshot.tasks {
            let Some(&wanted) = self.marked.get(task.id.as_str()) else {
                continue;
            };
            if wanted {
                marked += 1;
            }
            if self
                .changes
                .record_marker(task, &self.settings.label, wanted)
            {
                let verb = if wanted { "Adding" } else { "Removing" };
                tracing::debug!("{} label on '{}'", verb, task.content);
            }
        }

        Outcome {
            changes: self.changes,
            marked,
            warnings: self.warnings,
        }
    }
}
