//! Schedule data model: circuits and distribution boards.

pub mod board;
pub mod circuit;

pub use board::{
    create_default_board, create_main_board, generate_board_id, next_sub_board_name, BoardField,
    DistributionBoard, MAIN_BOARD_ID,
};
pub use circuit::{Circuit, Field};
