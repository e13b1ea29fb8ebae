/// Internal parts for parsing DOC file structures.
///
/// This module contains parsers for the binary structures used in
/// legacy Word documents:
/// - FIB (File Information Block)
/// - Piece table (CLX, PlcPcd, Pcd)
/// - Piece-by-piece text extraction
pub mod fib;
pub mod piece_table;
pub mod text;
