pub mod state_change;
