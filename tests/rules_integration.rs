use chess_rules::{
    Color, GameError, GameState, Move, MoveFlag, Outcome, Piece, PieceKind, Position, Square,
};
use test_case::test_case;

/// Helper: load a game from position text.
fn game(text: &str) -> GameState {
    GameState::from_text(text).expect("fixture should parse")
}

/// Helper: play space-separated coordinate moves.
fn play(game: &mut GameState, moves: &str) {
    for text in moves.split_whitespace() {
        if let Err(e) = game.play(text) {
            panic!("{text} should be legal in {}: {e}", game.position());
        }
    }
}

fn sq(text: &str) -> Square {
    text.parse().expect("valid square")
}

fn move_names(moves: &[Move]) -> Vec<String> {
    let mut names: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
    names.sort();
    names
}

// ---------------------------------------------------------------
// Legal move queries
// ---------------------------------------------------------------

#[test]
fn legal_moves_are_idempotent() {
    let mut game = GameState::new();
    play(&mut game, "e2e4 c7c5 g1f3");

    let first = move_names(game.legal_moves());
    let second = move_names(game.legal_moves());

    assert_eq!(first, second);
}

#[test]
fn knight_check_allows_no_blocks() {
    let game = game("4kb1r/3pppp1/6q1/8/8/R4n2/5PPP/6K1 w - - 0 1");

    assert!(game.is_check());
    assert_eq!(game.attack_context().checker_count(), 1);
    assert_eq!(move_names(game.legal_moves()), ["a3f3", "g1f1", "g1h1"]);
}

#[test]
fn double_check_allows_king_moves_only() {
    let game = game("8/6k1/8/4Bp2/3q4/8/p7/5KR1 b - - 0 1");

    assert!(game.is_double_check());
    assert_eq!(
        move_names(game.legal_moves()),
        ["g7f7", "g7f8", "g7h6", "g7h7"]
    );
}

#[test]
fn pinned_knight_cannot_move_after_castling() {
    let mut game = game("rn1qk2r/pp3ppp/2p1pn2/3p1b2/1bPP1B2/2N1PN2/PP3PPP/R2QKB1R b KQkq - 0 1");
    let castle = game.parse_move("e8g8").expect("black may castle");
    assert_eq!(castle.flag(), MoveFlag::CastleKing);
    assert!(game.parse_move("e8c8").is_err());

    game.apply_move(castle).unwrap();

    assert_eq!(
        game.position().to_text(),
        "rn1q1rk1/pp3ppp/2p1pn2/3p1b2/1bPP1B2/2N1PN2/PP3PPP/R2QKB1R w KQ - 1 2"
    );
    assert!(game.moves_from(sq("c3")).is_empty());
}

#[test]
fn en_passant_capture_removes_pawn() {
    let mut game = game("rnbqkbnr/ppp1pppp/8/2Pp4/8/2N5/PP1PPPPP/R1BQKBNR w KQkq d6 0 2");
    let mv = game.parse_move("c5d6").expect("en passant is legal");
    assert_eq!(mv.flag(), MoveFlag::EnPassant);

    game.apply_move(mv).unwrap();

    assert_eq!(game.position().piece_at(sq("d5")), None);
    assert_eq!(
        game.position().piece_at(sq("d6")),
        Some(Piece::new(Color::White, PieceKind::Pawn))
    );
    assert_eq!(game.position().count(Color::Black, PieceKind::Pawn), 7);
    assert_eq!(game.position().halfmove_clock(), 0);
}

#[test]
fn en_passant_expires_after_one_ply() {
    let mut game = GameState::new();
    play(&mut game, "e2e4 a7a6 e4e5 d7d5");
    assert!(game.parse_move("e5d6").is_ok());

    play(&mut game, "h2h3 h7h6");
    assert!(game.parse_move("e5d6").is_err());
}

#[test_case("4kb2/8/8/KPp4r/8/8/8/2R2B2 w - c6 0 2", "b5"; "rook along vacated rank")]
#[test_case("1r2k3/4ppb1/P7/1Pp5/2P5/1K6/3B2R1/8 w - c6 0 2", "b5"; "capturing pawn pinned on file")]
fn en_passant_excluded_when_it_exposes_king(text: &str, pawn: &str) {
    let game = game(text);

    assert!(
        game.moves_from(sq(pawn))
            .iter()
            .all(|mv| mv.flag() != MoveFlag::EnPassant)
    );
    assert_eq!(move_names(&game.moves_from(sq(pawn))), ["b5b6"]);
}

#[test]
fn promotion_offers_four_pieces() {
    let mut game = game("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
    assert_eq!(
        move_names(&game.moves_from(sq("a7"))),
        ["a7a8b", "a7a8n", "a7a8q", "a7a8r"]
    );

    play(&mut game, "a7a8q");

    assert_eq!(
        game.position().piece_at(sq("a8")),
        Some(Piece::new(Color::White, PieceKind::Queen))
    );
    assert_eq!(game.position().count(Color::White, PieceKind::Pawn), 0);
    assert_eq!(game.status_text(), "Black is in check");
}

// ---------------------------------------------------------------
// Castling rights
// ---------------------------------------------------------------

#[test]
fn castling_moves_both_pieces() {
    let mut game = game("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");

    play(&mut game, "e1g1");
    assert_eq!(
        game.position().to_text(),
        "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1"
    );

    play(&mut game, "e8c8");
    assert_eq!(
        game.position().to_text(),
        "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2"
    );
}

#[test_case("e2e4 e7e5 e1e2 e8e7 e2e1 e7e8", "-"; "kings wander home")]
#[test_case("h2h4 h7h5 h1h3", "Qkq"; "king rook moves")]
#[test_case("a2a4 h7h5 a1a3 h8h6", "Kq"; "both sides move a rook")]
fn moved_pieces_lose_castling_rights(moves: &str, expected: &str) {
    let mut game = GameState::new();
    play(&mut game, moves);

    let text = game.position().to_text();
    let castling = text.split_whitespace().nth(2).unwrap();
    assert_eq!(castling, expected);
}

#[test]
fn capturing_a_rook_removes_its_right() {
    let mut game = game("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    play(&mut game, "a1a8");

    assert_eq!(
        game.position().to_text(),
        "R3k2r/8/8/8/8/8/8/4K2R b Kk - 0 1"
    );
    assert!(game.moves_from(sq("e8")).iter().all(|mv| !mv.flag().is_castle()));
}

#[test]
fn castling_rights_survive_for_unmoved_pieces_after_a_rook_returns() {
    let mut game = GameState::new();
    play(&mut game, "g1f3 g8f6 h1g1 h8g8 g1h1 g8h8");

    let text = game.position().to_text();
    assert_eq!(text.split_whitespace().nth(2), Some("Qq"));
}

// ---------------------------------------------------------------
// Errors and status
// ---------------------------------------------------------------

#[test]
fn illegal_move_leaves_game_unchanged() {
    let mut game = game("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1");
    let before = game.position().clone();
    let castle = Move::new(Square::E1, Square::G1, MoveFlag::CastleKing);

    assert_eq!(game.apply_move(castle), Err(GameError::IllegalMove(castle)));
    assert_eq!(game.position(), &before);
    assert_eq!(game.repetition_count(), 1);
}

#[test_case("4k3/8/8/8/8/8/8/4K3 x - - 0 1"; "bad side to move")]
#[test_case("4k3/8/8/8/8/8/8/4K3 w - - zero 1"; "non numeric clock")]
#[test_case("4k3/8/8/8/8/8/8/4X3 w - - 0 1"; "unknown piece")]
#[test_case("4k3/8/8/8/8/8/8/4K3 w - -"; "missing fields")]
fn malformed_text_is_rejected(text: &str) {
    assert!(matches!(
        GameState::from_text(text),
        Err(GameError::Parse(_))
    ));
}

#[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", "White's move"; "start")]
#[test_case("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1", "Black's move"; "after e4")]
#[test_case("rnbqk1nr/pppp1ppp/8/8/7b/8/PPPPP1PP/RNBQKBNR w KQkq - 0 1", "White is in check"; "check")]
#[test_case("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3", "Checkmate. Black wins"; "mate")]
#[test_case("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", "Stalemate"; "stalemate")]
#[test_case("7k/5Q2/6K1/8/8/8/8/8 b - - 100 90", "Draw by fifty-move rule"; "fifty moves outranks stalemate")]
#[test_case("k7/3N4/1K6/8/8/8/8/8 b - - 0 1", "Draw by insufficient material"; "insufficient outranks stalemate")]
#[test_case("4k3/8/8/8/8/8/8/4K3 w - - 0 1", "Draw by insufficient material"; "bare kings")]
fn status_text(text: &str, expected: &str) {
    assert_eq!(game(text).status_text(), expected);
}

#[test]
fn threefold_repetition_by_knight_shuffle() {
    let mut game = GameState::new();
    play(&mut game, "g1f3 g8f6 f3g1 f6g8 g1f3 g8f6 f3g1");
    assert!(!game.is_threefold_repetition());

    play(&mut game, "f6g8");

    assert!(game.is_threefold_repetition());
    assert_eq!(game.outcome(), Some(Outcome::ThreefoldRepetition));
    assert!(game.is_game_over());
}

#[test]
fn scholars_mate_outcome() {
    let mut game = GameState::new();
    play(&mut game, "e2e4 e7e5 f1c4 b8c6 d1h5 g8f6 h5f7");

    assert!(game.is_checkmate());
    assert_eq!(game.outcome().and_then(Outcome::winner), Some(Color::White));
    assert_eq!(game.status_text(), "Checkmate. White wins");
    assert!(game.legal_moves().is_empty());
}

#[test]
fn game_round_trips_through_position_text() {
    let mut game = GameState::new();
    play(&mut game, "d2d4 g8f6 c2c4 e7e6 b1c3 f8b4");

    let text = game.position().to_text();
    let reloaded = Position::from_text(&text).unwrap();

    assert_eq!(&reloaded, game.position());
    assert_eq!(
        text,
        "rnbqk2r/pppp1ppp/4pn2/8/1bPP4/2N5/PP2PPPP/R1BQKBNR w KQkq - 2 4"
    );
}
