mod allocator;
mod instance;
mod layout;
mod part;
mod placement;
mod sheet;

#[doc(inline)]
pub use allocator::{SheetAllocator, SheetUsage};
#[doc(inline)]
pub use instance::{Instance, PartInstance};
#[doc(inline)]
pub use layout::{Infeasibility, Layout, SheetLayout, Unplaced};
#[doc(inline)]
pub use part::Part;
#[doc(inline)]
pub use placement::{PlacedPart, Placement};
#[doc(inline)]
pub use sheet::Sheet;
