mod depth;
mod order_status;
mod order_type;
mod owned_order;
mod parse;
mod request;
mod side;
mod trade;

pub use depth::DepthLevel;
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use owned_order::OwnedOrder;
pub use parse::ParseError;
pub use request::{CancelOrder, OrderRequest, PlaceOrder};
pub use side::Side;
pub use trade::TradeEvent;
