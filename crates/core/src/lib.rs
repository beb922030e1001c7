pub mod breakdown;
pub mod burn;
pub mod money;
pub mod period;
pub mod projection;
pub mod role;

pub use breakdown::{Breakdown, BreakdownError, BreakdownLine, BreakdownView};
pub use burn::{EntryError, EntryForm, MonthlyBurn, MonthlyEntry, MonthlyRevenue};
pub use money::{Money, DEFAULT_CURRENCY};
pub use period::{DateRange, YearMonth};
pub use projection::{Projection, ProjectedMonth, RemainingBalance};
pub use role::{AdminAllowList, Role};
