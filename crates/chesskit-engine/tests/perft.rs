//! Move generation validation against published perft counts, plus
//! end-to-end scenario tests that cross module boundaries.

use chesskit_core::{Color, Square};
use chesskit_engine::movegen::perft::{perft, perft_divide};
use chesskit_engine::{pregenerate_tables, Board, Move, MoveGen};

fn sq(s: &str) -> Square {
    Square::from_algebraic(s).expect("valid square literal")
}

struct PerftCase {
    name: &'static str,
    fen: &'static str,
    expected: &'static [u64],
}

const CASES: &[PerftCase] = &[
    PerftCase {
        name: "startpos",
        fen: Board::STARTPOS,
        expected: &[20, 400, 8902, 197_281],
    },
    PerftCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        expected: &[48, 2039, 97_862],
    },
    PerftCase {
        name: "en_passant_endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        expected: &[14, 191, 2812],
    },
    PerftCase {
        name: "promotion_frenzy",
        fen: "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        expected: &[24, 496, 9483],
    },
];

#[test]
fn perft_matches_published_counts() {
    pregenerate_tables();
    for case in CASES {
        let mut board = Board::from_fen(case.fen).expect("case FEN parses");
        let before = board.clone();
        for (i, &expected) in case.expected.iter().enumerate() {
            let depth = (i + 1) as u32;
            let got = perft(&mut board, depth);
            assert_eq!(
                got, expected,
                "{} at depth {}: expected {}, got {}",
                case.name, depth, expected, got
            );
        }
        assert_eq!(board, before, "{}: perft must restore the board", case.name);
    }
}

#[test]
fn perft_divide_agrees_with_totals() {
    let mut board = Board::from_fen(CASES[1].fen).unwrap();
    let split = perft_divide(&mut board, 2);
    assert_eq!(split.len(), 48);
    let total: u64 = split.iter().map(|(_, n)| n).sum();
    assert_eq!(total, 2039);
}

#[test]
fn double_push_reply_opens_en_passant_window() {
    // After 1.e4 it is Black to move with the e3 window open.
    let mut board =
        Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();

    // g1f3 belongs to White and must not be legal now.
    let white_move = Move::new_from_squares(sq("g1"), sq("f3"), None, &board);
    if let Some(m) = white_move {
        assert!(!m.is_legal_on(&mut board));
    }

    // e7e5 is legal and opens the e6 window.
    let reply = Move::from_text("e7e5", &board).expect("move parses against the board");
    assert!(reply.is_legal_on(&mut board));
    board.make(reply);
    assert_eq!(
        board.en_passant_target().map(|s| s.to_algebraic()),
        Some("e6".to_string())
    );
}

#[test]
fn blocked_king_has_three_moves_and_no_check() {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/4p3/4K3 w - - 0 1").unwrap();
    assert!(board.checkers(Color::White).is_empty());

    let mut texts: Vec<String> = Vec::new();
    let mut gen = MoveGen::new(&mut board);
    while let Some(m) = gen.next() {
        texts.push(m.to_text());
    }
    texts.sort();
    // The pawn guards d1 and f1 but can itself be taken.
    assert_eq!(texts, ["e1d2", "e1e2", "e1f2"]);
}

#[test]
fn back_rank_mate_is_checkmate() {
    // Ra8# delivered against the castled king.
    let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
    let mate = Move::from_text("a1a8", &board).unwrap();
    assert!(mate.is_legal_on(&mut board));
    board.make(mate);

    let mut gen = MoveGen::new(&mut board);
    let mut yielded = 0;
    while gen.next().is_some() {
        yielded += 1;
    }
    assert_eq!(yielded, 0);
    assert!(gen.is_checkmate());
    assert!(!gen.is_stalemate());
}

#[test]
fn queen_stalemate_is_not_checkmate() {
    let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let mut gen = MoveGen::new(&mut board);
    assert!(gen.next().is_none());
    assert!(gen.is_stalemate());
    assert!(!gen.is_checkmate());
}

#[test]
fn generated_moves_parse_and_print_consistently() {
    // Text round-trip law over a position with castles, promotions and
    // an en passant capture available.
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let mut board = Board::from_fen(fen).unwrap();
    let mut moves = Vec::new();
    let mut gen = MoveGen::new(&mut board);
    while let Some(m) = gen.next() {
        moves.push(m);
    }
    for m in moves {
        let text = m.to_text();
        let reparsed = Move::from_text(&text, &board).expect("generated move text parses");
        assert_eq!(reparsed, m, "round-trip through text for {}", text);
        assert_eq!(reparsed.to_text(), text);
    }
}

#[test]
fn every_generated_move_unmakes_bitwise() {
    let fens = [
        Board::STARTPOS,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
    ];
    for fen in fens {
        let mut board = Board::from_fen(fen).unwrap();
        let original = board.clone();
        let mut moves = Vec::new();
        let mut gen = MoveGen::new(&mut board);
        while let Some(m) = gen.next() {
            moves.push(m);
        }
        for m in moves {
            board.make(m);
            board.unmake(m);
            assert_eq!(board, original, "make/unmake of {} on {}", m, fen);
        }
    }
}
