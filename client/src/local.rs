// ═══════════════════════════════════════════════════════════════════════
// Local Service — an in-process authoritative game service
//
// Holds the full-information board for every game, referees moves with
// the engine's legality and combat rules, and publishes the resulting
// event tokens to every subscriber of the game's topic. Used for
// hot-seat play and tests.
// ═══════════════════════════════════════════════════════════════════════

use crate::service::{topic, FeedMessage, GameService, ServiceError, Subscription};
use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use stratego_engine::board::{Board, Owner, Square};
use stratego_engine::combat::{resolve_attack, CombatOutcome};
use stratego_engine::events::EventToken;
use stratego_engine::movement::{check_move, MoveKind};
use stratego_engine::placement::{apply_layout, validate_layout, StartingPositions};
use stratego_engine::state::GameId;
use tracing::{debug, info};

const ID_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Host layout accepted, no guest yet.
    Waiting,
    Playing,
    /// Flag captured. The game is forgotten once the final tokens are out.
    Over,
}

#[derive(Debug)]
struct LocalGame {
    board: Board,
    status: GameStatus,
    turn: Owner,
}

pub struct LocalService {
    prefix: String,
    rng: ChaCha8Rng,
    games: HashMap<GameId, LocalGame>,
    subscribers: Vec<(String, Sender<String>)>,
}

impl LocalService {
    /// Game ids are drawn from `seed`, so runs are reproducible.
    pub fn new(seed: u64) -> LocalService {
        LocalService::with_prefix(seed, "games")
    }

    pub fn with_prefix(seed: u64, prefix: &str) -> LocalService {
        LocalService {
            prefix: prefix.to_string(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            games: HashMap::new(),
            subscribers: Vec::new(),
        }
    }

    pub fn shared(seed: u64) -> Arc<Mutex<LocalService>> {
        Arc::new(Mutex::new(LocalService::new(seed)))
    }

    pub fn status(&self, id: &GameId) -> Option<GameStatus> {
        self.games.get(id).map(|g| g.status)
    }

    /// The referee's full-information board.
    pub fn board(&self, id: &GameId) -> Option<&Board> {
        self.games.get(id).map(|g| &g.board)
    }

    fn fresh_id(&mut self) -> GameId {
        loop {
            let id: String = (0..ID_LENGTH)
                .map(|_| self.rng.sample(Alphanumeric) as char)
                .collect();
            let id = GameId(id.to_lowercase());
            if !self.games.contains_key(&id) {
                return id;
            }
        }
    }

    fn game_mut(&mut self, id: &GameId) -> Result<&mut LocalGame, ServiceError> {
        self.games
            .get_mut(id)
            .ok_or_else(|| ServiceError::UnknownGame(id.clone()))
    }

    fn publish(&mut self, id: &GameId, event: EventToken) -> Result<(), ServiceError> {
        let topic = topic(&self.prefix, id);
        let payload = FeedMessage::new(event.to_string()).encode()?;
        let before = self.subscribers.len();
        self.subscribers
            .retain(|(t, tx)| t != &topic || tx.send(payload.clone()).is_ok());
        let pruned = before - self.subscribers.len();
        debug!(%topic, %event, pruned, "published");
        Ok(())
    }

    /// Forget a finished game and hang up on its feed. Lines already
    /// published stay readable by subscribers until they poll.
    fn retire(&mut self, id: &GameId) {
        let topic = topic(&self.prefix, id);
        self.games.remove(id);
        self.subscribers.retain(|(t, _)| t != &topic);
        info!(game_id = %id, "game over");
    }
}

impl GameService for LocalService {
    fn create_game(&mut self, positions: &StartingPositions) -> Result<GameId, ServiceError> {
        validate_layout(positions, Owner::Host)?;
        let mut board = Board::new();
        apply_layout(&mut board, positions, Owner::Host);

        let id = self.fresh_id();
        self.games.insert(
            id.clone(),
            LocalGame { board, status: GameStatus::Waiting, turn: Owner::Host },
        );
        info!(game_id = %id, "game created");
        Ok(id)
    }

    fn join_game(&mut self, id: &GameId, positions: &StartingPositions) -> Result<GameId, ServiceError> {
        let game = self.game_mut(id)?;
        if game.status != GameStatus::Waiting {
            return Err(ServiceError::AlreadyJoined(id.clone()));
        }
        validate_layout(positions, Owner::Guest)?;
        apply_layout(&mut game.board, positions, Owner::Guest);
        game.status = GameStatus::Playing;

        info!(game_id = %id, "guest joined");
        // Published before the guest has subscribed; only the host sees it.
        self.publish(id, EventToken::Started)?;
        Ok(id.clone())
    }

    fn submit_move(&mut self, id: &GameId, from: Square, to: Square) -> Result<(), ServiceError> {
        let game = self.game_mut(id)?;
        if game.status != GameStatus::Playing {
            return Err(ServiceError::NotInProgress(id.clone()));
        }

        let mover = game.turn;
        let kind = check_move(&game.board, mover, mover, true, from, to)?;
        let attacker = game.board[from];
        game.board.clear(from);
        game.turn = mover.opponent();

        let mut events = Vec::with_capacity(2);
        match kind {
            MoveKind::Move => {
                game.board[to] = attacker;
                events.push(EventToken::Moves { from, to });
            }
            MoveKind::Attack => {
                let defender = game.board[to];
                match resolve_attack(attacker.rank, defender.rank) {
                    // The attacks token carries no rank, so the winner stays as
                    // hidden as it was.
                    CombatOutcome::Captures => {
                        game.board[to] = attacker;
                        events.push(EventToken::Attacks { from, to });
                    }
                    CombatOutcome::CapturesFlag => {
                        game.board[to] = attacker;
                        game.status = GameStatus::Over;
                        events.push(EventToken::Attacks { from, to });
                        events.push(EventToken::Wins { winner: Some(mover) });
                    }
                    CombatOutcome::Repelled => {
                        events.push(EventToken::Defends { from, to: Some(to) });
                    }
                    CombatOutcome::Revealed => {
                        game.board[to].revealed = true;
                        events.push(EventToken::Reveals { from, to, rank: defender.rank });
                    }
                }
            }
        }

        let over = game.status == GameStatus::Over;
        for event in events {
            self.publish(id, event)?;
        }
        if over {
            self.retire(id);
        }
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<Subscription, ServiceError> {
        let (tx, sub) = Subscription::channel(topic);
        self.subscribers.push((topic.to_string(), tx));
        debug!(%topic, "subscribed");
        Ok(sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratego_engine::board::Cell;
    use stratego_engine::catalog::Rank;
    use stratego_engine::placement::{random_placement, starting_positions};
    use stratego_engine::visibility::board_view;

    fn sq(i: usize) -> Square {
        Square::new(i).unwrap()
    }

    fn layout(owner: Owner) -> StartingPositions {
        let mut board = Board::new();
        random_placement(&mut board, owner);
        starting_positions(&board, owner)
    }

    fn playing(service: &mut LocalService) -> GameId {
        let id = service.create_game(&layout(Owner::Host)).unwrap();
        service.join_game(&id, &layout(Owner::Guest)).unwrap();
        id
    }

    #[test]
    fn test_seeded_ids_repeat() {
        let a = LocalService::new(3).create_game(&layout(Owner::Host)).unwrap();
        let b = LocalService::new(3).create_game(&layout(Owner::Host)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.0.len(), ID_LENGTH);
    }

    #[test]
    fn test_create_rejects_guest_layout() {
        let mut service = LocalService::new(1);
        let err = service.create_game(&layout(Owner::Guest)).unwrap_err();
        assert!(matches!(err, ServiceError::Layout(_)));
    }

    #[test]
    fn test_join_unknown_and_twice() {
        let mut service = LocalService::new(1);
        let err = service.join_game(&GameId::from("nope"), &layout(Owner::Guest)).unwrap_err();
        assert!(matches!(err, ServiceError::UnknownGame(_)));

        let id = playing(&mut service);
        assert_eq!(service.status(&id), Some(GameStatus::Playing));
        let err = service.join_game(&id, &layout(Owner::Guest)).unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyJoined(_)));
    }

    #[test]
    fn test_move_before_join_refused() {
        let mut service = LocalService::new(1);
        let id = service.create_game(&layout(Owner::Host)).unwrap();
        let err = service.submit_move(&id, sq(30), sq(40)).unwrap_err();
        assert!(matches!(err, ServiceError::NotInProgress(_)));
    }

    #[test]
    fn test_wrong_side_move_refused() {
        let mut service = LocalService::new(1);
        let id = playing(&mut service);
        // Host moves first; a guest piece may not move yet
        let err = service.submit_move(&id, sq(61), sq(51)).unwrap_err();
        assert!(matches!(err, ServiceError::IllegalMove(_)));
    }

    #[test]
    fn test_move_published_to_subscribers() {
        let mut service = LocalService::new(1);
        let id = playing(&mut service);
        let mut sub = service.subscribe(&topic("games", &id)).unwrap();
        let mut other = service.subscribe("games/other/moves").unwrap();

        service.submit_move(&id, sq(30), sq(40)).unwrap();
        let lines: Vec<String> = sub.poll().iter().map(|p| FeedMessage::decode(p)).collect();
        assert_eq!(lines, vec!["moves 30 40".to_string()]);
        assert!(other.poll().is_empty());

        let board = service.board(&id).unwrap();
        assert_eq!(board[sq(40)].rank, Rank::Colonel);
        assert!(board[sq(30)].is_empty());
    }

    #[test]
    fn test_closed_subscribers_pruned() {
        let mut service = LocalService::new(1);
        let id = playing(&mut service);
        let sub = service.subscribe(&topic("games", &id)).unwrap();
        drop(sub);
        service.submit_move(&id, sq(30), sq(40)).unwrap();
        assert!(service.subscribers.is_empty());
    }

    #[test]
    fn test_flag_capture_ends_game() {
        let mut service = LocalService::new(1);
        let id = playing(&mut service);
        let mut sub = service.subscribe(&topic("games", &id)).unwrap();
        {
            let game = service.game_mut(&id).unwrap();
            game.board.set(50, Cell::piece(Rank::Sergeant, Owner::Host));
            game.board.set(60, Cell::piece(Rank::Flag, Owner::Guest));
        }
        service.submit_move(&id, sq(50), sq(60)).unwrap();

        let lines: Vec<String> = sub.poll().iter().map(|p| FeedMessage::decode(p)).collect();
        assert_eq!(lines, vec!["attacks 50 60".to_string(), "wins host".to_string()]);
        // Finished games are dropped along with their feed
        assert_eq!(service.status(&id), None);
        assert!(service.subscribers.is_empty());
        assert!(sub.poll().is_empty());
        let err = service.submit_move(&id, sq(60), sq(50)).unwrap_err();
        assert!(matches!(err, ServiceError::UnknownGame(_)));
    }

    #[test]
    fn test_capture_keeps_winner_hidden() {
        let mut service = LocalService::new(1);
        let id = playing(&mut service);
        let mut sub = service.subscribe(&topic("games", &id)).unwrap();
        {
            let game = service.game_mut(&id).unwrap();
            game.board.set(50, Cell::piece(Rank::Marshal, Owner::Host));
            game.board.set(60, Cell::piece(Rank::Spy, Owner::Guest));
        }
        service.submit_move(&id, sq(50), sq(60)).unwrap();

        let lines: Vec<String> = sub.poll().iter().map(|p| FeedMessage::decode(p)).collect();
        assert_eq!(lines, vec!["attacks 50 60".to_string()]);
        let board = service.board(&id).unwrap();
        assert_eq!(board[sq(60)].rank, Rank::Marshal);
        assert!(!board[sq(60)].revealed);
        // The defender's side never learned the rank
        assert_eq!(board_view(board, Owner::Guest)[60].rank, None);
    }

    #[test]
    fn test_failed_attack_on_bomb() {
        let mut service = LocalService::new(1);
        let id = playing(&mut service);
        let mut sub = service.subscribe(&topic("games", &id)).unwrap();
        {
            let game = service.game_mut(&id).unwrap();
            game.board.set(50, Cell::piece(Rank::Marshal, Owner::Host));
            game.board.set(60, Cell::piece(Rank::Bomb, Owner::Guest));
        }
        service.submit_move(&id, sq(50), sq(60)).unwrap();

        let lines: Vec<String> = sub.poll().iter().map(|p| FeedMessage::decode(p)).collect();
        assert_eq!(lines, vec!["defends 50 60".to_string()]);
        let board = service.board(&id).unwrap();
        assert!(board[sq(50)].is_empty());
        assert_eq!(board[sq(60)].rank, Rank::Bomb);
    }
}
