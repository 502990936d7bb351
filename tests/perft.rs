use chess_rules::Position;
use chess_rules::movegen::legal_moves;
use chess_rules::perft::perft;
use shakmaty::{CastlingMode, Chess, Position as _, fen::Fen};
use test_case::test_case;

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const PROMOTIONS: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const TALKCHESS: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
const MIDDLEGAME: &str =
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P3/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

fn position(text: &str) -> Position {
    Position::from_text(text).expect("fixture should parse")
}

fn reference(text: &str) -> Chess {
    text.parse::<Fen>()
        .expect("valid FEN")
        .into_position(CastlingMode::Standard)
        .expect("valid position")
}

#[test_case(1, 20)]
#[test_case(2, 400)]
#[test_case(3, 8_902)]
#[test_case(4, 197_281)]
fn start_position(depth: u32, expected: u64) {
    assert_eq!(perft(&position(START), depth), expected);
}

#[test_case(KIWIPETE, 1, 48; "kiwipete 1")]
#[test_case(KIWIPETE, 2, 2_039; "kiwipete 2")]
#[test_case(KIWIPETE, 3, 97_862; "kiwipete 3")]
#[test_case(ENDGAME, 1, 14; "endgame 1")]
#[test_case(ENDGAME, 2, 191; "endgame 2")]
#[test_case(ENDGAME, 3, 2_812; "endgame 3")]
#[test_case(ENDGAME, 4, 43_238; "endgame 4")]
#[test_case(PROMOTIONS, 1, 6; "promotions 1")]
#[test_case(PROMOTIONS, 2, 264; "promotions 2")]
#[test_case(PROMOTIONS, 3, 9_467; "promotions 3")]
#[test_case(TALKCHESS, 1, 44; "talkchess 1")]
#[test_case(TALKCHESS, 2, 1_486; "talkchess 2")]
#[test_case(TALKCHESS, 3, 62_379; "talkchess 3")]
#[test_case(MIDDLEGAME, 1, 47; "middlegame 1")]
#[test_case(MIDDLEGAME, 2, 1_845; "middlegame 2")]
#[test_case(MIDDLEGAME, 3, 81_467; "middlegame 3")]
fn known_positions(text: &str, depth: u32, expected: u64) {
    assert_eq!(perft(&position(text), depth), expected);
}

/// Walks both move trees in lockstep and compares the move sets at every node.
fn assert_same_moves(ours: &Position, theirs: &Chess, depth: u32) {
    let mut our_moves: Vec<String> = legal_moves(ours).iter().map(|mv| mv.to_string()).collect();
    let mut their_moves: Vec<(String, shakmaty::Move)> = theirs
        .legal_moves()
        .into_iter()
        .map(|mv| (mv.to_uci(CastlingMode::Standard).to_string(), mv))
        .collect();
    our_moves.sort();
    their_moves.sort_by(|a, b| a.0.cmp(&b.0));

    let their_names: Vec<&str> = their_moves.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(our_moves, their_names, "move sets differ in {ours}");

    if depth <= 1 {
        return;
    }
    for mv in legal_moves(ours) {
        let name = mv.to_string();
        let (_, their_mv) = their_moves
            .iter()
            .find(|(other, _)| *other == name)
            .expect("move sets already compared equal");

        let mut next = ours.clone();
        next.apply_move(mv);
        let mut their_next = theirs.clone();
        their_next.play_unchecked(their_mv.clone());
        assert_same_moves(&next, &their_next, depth - 1);
    }
}

#[test_case(START, 3; "start")]
#[test_case(KIWIPETE, 2; "kiwipete")]
#[test_case(ENDGAME, 3; "endgame")]
#[test_case(PROMOTIONS, 2; "promotions")]
#[test_case(TALKCHESS, 2; "talkchess")]
#[test_case("rnbqkbnr/ppp1pppp/8/2Pp4/8/2N5/PP1PPPPP/R1BQKBNR w KQkq d6 0 2", 3; "en passant")]
#[test_case("rn1qk2r/pp3ppp/2p1pn2/3p1b2/1bPP1B2/2N1PN2/PP3PPP/R2QKB1R b KQkq - 0 1", 2; "castling")]
#[test_case("4kb1r/3pppp1/6q1/8/8/R4n2/5PPP/6K1 w - - 0 1", 3; "knight check")]
#[test_case("rnbqk1nr/pppp1ppp/8/8/7b/8/PPPPP1PP/RNBQKBNR w KQkq - 0 1", 2; "bishop check")]
fn matches_reference_generator(text: &str, depth: u32) {
    assert_same_moves(&position(text), &reference(text), depth);
}

#[test_case(KIWIPETE, 3)]
#[test_case(ENDGAME, 4)]
#[test_case(MIDDLEGAME, 3)]
fn matches_reference_perft(text: &str, depth: u32) {
    assert_eq!(
        perft(&position(text), depth),
        shakmaty::perft(&reference(text), depth)
    );
}
