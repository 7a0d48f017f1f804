//! Content planning: the theme catalog and the daily plan built from it.

mod plan;
mod themes;

pub use plan::{ContentPlan, PlanGenerator, DAILY_TAG, PAID_VALUE_PROMISES, TEASER_PATTERNS};
pub use themes::{Theme, ThemeRegistry, THEME_NAME_SEPARATOR};
