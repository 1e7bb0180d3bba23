pub mod block_flow;
pub mod proof_flow;
