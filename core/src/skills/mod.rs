pub mod index;
pub mod manifest;
pub mod record;
pub mod roots;

pub use index::{Catalog, LoadedSkill, SkillEntry, SkillIndex};
pub use manifest::{SKILL_FILE, SkillMetadata, extract_field};
pub use record::{LoadRecord, LoadRecordStore};
pub use roots::{DirectoryResolver, Location, Scope, SkillRoot};

use crate::error::Result;

/// Load `name` and note it in `records`. A failed record write is logged and
/// does not fail the load.
pub fn load_and_record(
    index: &SkillIndex,
    records: &LoadRecordStore,
    name: &str,
) -> Result<LoadedSkill> {
    let loaded = index.load(name)?;

    if let Err(e) = records.record(&loaded.skill_name, &loaded.base_dir) {
        tracing::warn!(
            skill = %loaded.skill_name,
            path = %records.path().display(),
            "failed to persist load record: {e}"
        );
    }

    Ok(loaded)
}
