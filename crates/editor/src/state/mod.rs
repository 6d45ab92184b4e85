pub mod scene;
pub mod selection;
pub mod settings;

pub use scene::{element_display_name, kind_icon, short_id, SceneState};
pub use selection::SelectionState;
pub use settings::EditorSettings;
