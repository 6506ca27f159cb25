pub mod events;
pub mod hand_actions;
pub mod hand_pots;
pub mod hands;
pub mod poker_tables;
pub mod showdown_results;
pub mod table_seats;

pub use events::Entity as Events;
pub use events::Model as Event;
pub use hand_actions::Entity as HandActions;
pub use hand_actions::Model as HandAction;
pub use hand_pots::Entity as HandPots;
pub use hand_pots::Model as HandPot;
pub use hands::Entity as Hands;
pub use hands::Model as Hand;
pub use poker_tables::Entity as PokerTables;
pub use poker_tables::Model as PokerTable;
pub use showdown_results::Entity as ShowdownResults;
pub use showdown_results::Model as ShowdownResult;
pub use table_seats::Entity as TableSeats;
pub use table_seats::Model as TableSeat;
