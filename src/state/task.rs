/// Task model: the category tree discovered on the root page and the units of
/// crawl work derived from it.
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A top-level category from the root page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub sub_categories: Vec<SubCategory>,
}

/// A subcategory whose link leads to a paginated result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCategory {
    pub name: String,
    pub link: Url,
}

/// One unit of crawl work: a (category, subcategory) pair
#[derive(Debug, Clone)]
pub struct Task {
    pub category: Arc<Category>,
    pub sub_category: SubCategory,
}

impl Task {
    /// Returns the composite key identifying this task across runs
    pub fn id(&self) -> String {
        task_id(&self.category.name, &self.sub_category.name)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Builds the task identifier `<category>-<subcategory>`
pub fn task_id(category: &str, sub_category: &str) -> String {
    format!("{}-{}", category, sub_category)
}

/// Flattens the category tree into the full task list
///
/// Each category is paired with its own subcategories only. Tasks whose
/// identifier collides with an earlier one are dropped so that every task id
/// maps to exactly one subcategory link.
pub fn flatten_tasks(categories: Vec<Category>) -> Vec<Task> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();

    for category in categories {
        let category = Arc::new(category);
        for sub_category in &category.sub_categories {
            let task = Task {
                category: Arc::clone(&category),
                sub_category: sub_category.clone(),
            };

            if !seen.insert(task.id()) {
                tracing::warn!(
                    "Duplicate task id '{}' ({}), keeping the first occurrence",
                    task.id(),
                    sub_category.link
                );
                continue;
            }

            tasks.push(task);
        }
    }

    tasks
}
