//! Per-user toggle state. The client encodes which toggles are open; this
//! side only stores the opaque value under a per-course preference name.

use crate::error::{FormatError, FormatResult};
use crate::format::host::UserPreferenceStore;

const PREFERENCE_PREFIX: &str = "topcoll_toggle_";
const MAX_VALUE_LEN: usize = 1024;

pub fn toggle_preference_name(course_id: i64) -> String {
    format!("{}{}", PREFERENCE_PREFIX, course_id)
}

pub fn toggle_state<S: UserPreferenceStore>(
    store: &S,
    course_id: i64,
    user_id: i64,
) -> FormatResult<Option<String>> {
    store.preference(user_id, &toggle_preference_name(course_id))
}

pub fn set_toggle_state<S: UserPreferenceStore>(
    store: &S,
    course_id: i64,
    user_id: i64,
    value: &str,
) -> FormatResult<()> {
    if value.len() > MAX_VALUE_LEN || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FormatError::InvalidValue {
            key: toggle_preference_name(course_id),
            message: format!("must be at most {} alphanumeric characters", MAX_VALUE_LEN),
        });
    }
    store.set_preference(user_id, &toggle_preference_name(course_id), value)
}
