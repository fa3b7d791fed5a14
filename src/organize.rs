use crate::catalog::{Category, Descriptor, Placement};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Default number of auto-placed lessons per module
pub const DEFAULT_VIDEOS_PER_MODULE: usize = 10;

/// Lessons grouped by module number, each module ordered by lesson number
pub type ModuleMap = BTreeMap<u32, Vec<Descriptor>>;

/// Groups parsed descriptors into modules
#[derive(Debug, Clone)]
pub struct Organizer {
    auto_place: bool,
    capacity: usize,
}

impl Organizer {
    pub fn new(auto_place: bool, capacity: usize) -> Self {
        Self {
            auto_place,
            capacity: capacity.max(1),
        }
    }

    /// Group descriptors of one category into modules.
    ///
    /// Loose descriptors (no module/lesson) are bucketed sequentially when
    /// auto-placement is on and dropped otherwise.
    pub fn organize(&self, descriptors: Vec<Descriptor>) -> ModuleMap {
        let (mut placed, loose): (Vec<_>, Vec<_>) =
            descriptors.into_iter().partition(Descriptor::is_placed);

        if !loose.is_empty() {
            if self.auto_place {
                let count = loose.len();
                placed.extend(self.auto_placed(loose));
                info!(
                    "📦 Auto-organized {} unmapped videos ({} per module)",
                    count, self.capacity
                );
            } else {
                warn!(
                    "⚠️ Dropping {} videos whose titles carry no module/lesson numbers",
                    loose.len()
                );
            }
        }

        let mut modules = ModuleMap::new();
        for descriptor in placed {
            if let Some(module) = descriptor.module_number() {
                modules.entry(module).or_default().push(descriptor);
            }
        }

        for lessons in modules.values_mut() {
            // stable: equal lesson numbers keep input order
            lessons.sort_by_key(|d| d.lesson_number());
        }

        modules
    }

    fn auto_placed(&self, loose: Vec<Descriptor>) -> impl Iterator<Item = Descriptor> + '_ {
        loose.into_iter().enumerate().map(move |(index, mut descriptor)| {
            let module = (index / self.capacity) as u32 + 1;
            let lesson = (index % self.capacity) as u32 + 1;
            descriptor.placement = Some(Placement::new(module, lesson));
            descriptor
        })
    }

    /// Organize each category separately, in the fixed category order.
    /// Categories without any descriptors are omitted.
    pub fn organize_by_category(&self, descriptors: Vec<Descriptor>) -> Vec<(Category, ModuleMap)> {
        let mut by_category: BTreeMap<Category, Vec<Descriptor>> = BTreeMap::new();
        for descriptor in descriptors {
            by_category.entry(descriptor.category).or_default().push(descriptor);
        }

        Category::ALL
            .iter()
            .filter_map(|category| {
                let descriptors = by_category.remove(category)?;
                let modules = self.organize(descriptors);
                if modules.is_empty() {
                    warn!("❌ No videos could be organized for {}", category);
                    return None;
                }
                Some((*category, modules))
            })
            .collect()
    }
}

/// Lessons of every module, modules ascending, preserving lesson order
pub fn flatten(modules: ModuleMap) -> Vec<Descriptor> {
    modules.into_values().flatten().collect()
}

/// Order a single collection by the first integer in each lesson title.
/// Titles without digits go last; ties keep input order.
pub fn order_by_title_number(descriptors: &mut [Descriptor]) {
    descriptors.sort_by_key(|d| first_number(d.lesson_title()).unwrap_or(u64::MAX));
}

fn first_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    Some(digits.parse().unwrap_or(u64::MAX - 1))
}
