pub mod chain_params;
