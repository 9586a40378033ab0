/// Swap module - end-of-frame presentation

mod swap_chain_controller;

pub use swap_chain_controller::SwapChainController;
