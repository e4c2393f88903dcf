//! Query methods for Snapshot
//!
//! Lookups the propagation walk needs: projects in order, the sections of a
//! project (with the implicit "no section" slot first) and the tasks of a
//! section.

use super::model::{Project, Section, Snapshot, Task};

impl Snapshot {
    /// Projects in display order
    pub fn ordered_projects(&self) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self.projects.iter().collect();
        projects.sort_by_key(|p| p.order);
        projects
    }

    /// Sections of a project in display order, preceded by `None`
    ///
    /// The leading `None` stands for the tasks that are not in any section.
    /// It is always present, even when every task has a section.
    ///
    /// # Arguments
    /// * `project_id` - The project whose sections to list
    pub fn sections_of(&self, project_id: &str) -> Vec<Option<&Section>> {
        let mut sections: Vec<&Section> = self
            .sections
            .iter()
            .filter(|s| s.project_id == project_id)
            .collect();
        sections.sort_by_key(|s| s.order);

        std::iter::once(None)
            .chain(sections.into_iter().map(Some))
            .collect()
    }

    /// All tasks of a project, regardless of section
    pub fn tasks_in_project(&self, project_id: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .collect()
    }

    /// Tasks of one section of a project
    ///
    /// # Arguments
    /// * `project_id` - Owning project
    /// * `section_id` - Section, or `None` for tasks outside any section
    pub fn tasks_in_section(&self, project_id: &str, section_id: Option<&str>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.project_id == project_id && t.section_id.as_deref() == section_id)
            .collect()
    }

    /// Find a task by its ID
    pub fn find_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Find a task by its ID and return a mutable reference
    pub fn find_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}
