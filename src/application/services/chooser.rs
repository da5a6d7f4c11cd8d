//! Interactive single choice on top of the `Selector` boundary

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::{SelectionItem, Selector};

/// Ask the user to pick one item; cancelling is an error.
pub fn choose_one(
    selector: &dyn Selector,
    prompt: &str,
    items: &[SelectionItem],
) -> ApplicationResult<SelectionItem> {
    debug!("choose_one: prompt={:?} items={}", prompt, items.len());
    selector
        .select_one(items, prompt)
        .map_err(|message| ApplicationError::OperationFailed {
            context: prompt.to_string(),
            source: message.into(),
        })?
        .ok_or(ApplicationError::SelectionCancelled)
}
