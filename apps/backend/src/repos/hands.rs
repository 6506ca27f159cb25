//! Hand repository functions for domain layer (generic over ConnectionTrait).

use sea_orm::ConnectionTrait;

use super::{opt_seat_from_db, seat_from_db};
use crate::adapters::hands_sea as hands_adapter;
use crate::domain::cards::Card;
use crate::domain::cards_serde::{decode_cards, encode_cards};
use crate::domain::hand_phase::HandPhase;
use crate::entities::hands;
use crate::errors::domain::DomainError;

/// Hand domain model. `deck` holds the undealt remainder in dealing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    pub id: i64,
    pub table_id: i64,
    pub hand_no: i32,
    pub phase: HandPhase,
    pub dealer_seat: u8,
    pub small_blind_seat: u8,
    pub big_blind_seat: u8,
    pub current_actor: Option<u8>,
    pub current_bet: i64,
    pub min_raise_increment: i64,
    pub pot: i64,
    pub community: Vec<Card>,
    pub deck: Vec<Card>,
    pub action_deadline: Option<time::OffsetDateTime>,
    pub showdown_started_at: Option<time::OffsetDateTime>,
    pub last_runout_at: Option<time::OffsetDateTime>,
    pub completed_at: Option<time::OffsetDateTime>,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
    pub version: i32,
}

impl Hand {
    pub fn is_live(&self) -> bool {
        !self.phase.is_terminal()
    }

    /// Showdown has been evaluated and chips awarded; only the display delay remains.
    pub fn is_resolved(&self) -> bool {
        self.showdown_started_at.is_some()
    }
}

impl TryFrom<hands::Model> for Hand {
    type Error = DomainError;

    fn try_from(model: hands::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            table_id: model.table_id,
            hand_no: model.hand_no,
            phase: model.phase.parse()?,
            dealer_seat: seat_from_db(model.dealer_seat)?,
            small_blind_seat: seat_from_db(model.small_blind_seat)?,
            big_blind_seat: seat_from_db(model.big_blind_seat)?,
            current_actor: opt_seat_from_db(model.current_actor_seat)?,
            current_bet: model.current_bet,
            min_raise_increment: model.min_raise_increment,
            pot: model.pot,
            community: decode_cards(&model.community_cards)?,
            deck: decode_cards(&model.deck)?,
            action_deadline: model.action_deadline,
            showdown_started_at: model.showdown_started_at,
            last_runout_at: model.last_runout_at,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        })
    }
}

/// Parameters for a freshly created hand in the `dealing` phase.
#[derive(Debug, Clone)]
pub struct NewHand {
    pub table_id: i64,
    pub hand_no: i32,
    pub dealer_seat: u8,
    pub small_blind_seat: u8,
    pub big_blind_seat: u8,
    pub min_raise_increment: i64,
    pub deck: Vec<Card>,
    pub created_at: time::OffsetDateTime,
}

pub async fn require_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<Hand, DomainError> {
    Hand::try_from(hands_adapter::require_hand(conn, hand_id).await?)
}

/// The table's single non-terminal hand, if any.
pub async fn find_live_for_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<Option<Hand>, DomainError> {
    hands_adapter::find_live_for_table(conn, table_id)
        .await?
        .map(Hand::try_from)
        .transpose()
}

pub async fn find_latest_for_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<Option<Hand>, DomainError> {
    hands_adapter::find_latest_for_table(conn, table_id)
        .await?
        .map(Hand::try_from)
        .transpose()
}

pub async fn next_hand_no<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<i32, DomainError> {
    Ok(hands_adapter::next_hand_no(conn, table_id).await?)
}

pub async fn create_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    new: NewHand,
) -> Result<Hand, DomainError> {
    let dto = hands_adapter::HandCreate {
        table_id: new.table_id,
        hand_no: new.hand_no,
        phase: HandPhase::Dealing.as_str().to_string(),
        dealer_seat: new.dealer_seat,
        small_blind_seat: new.small_blind_seat,
        big_blind_seat: new.big_blind_seat,
        min_raise_increment: new.min_raise_increment,
        deck: encode_cards(&new.deck),
        community_cards: encode_cards(&[]),
        created_at: new.created_at,
    };
    Hand::try_from(hands_adapter::create_hand(conn, dto).await?)
}

/// Persist every mutable column, checked against `hand.version`.
pub async fn write_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand: &Hand,
) -> Result<Hand, DomainError> {
    let dto = hands_adapter::HandWrite {
        id: hand.id,
        expected_version: hand.version,
        phase: hand.phase.as_str().to_string(),
        current_actor_seat: hand.current_actor,
        current_bet: hand.current_bet,
        min_raise_increment: hand.min_raise_increment,
        pot: hand.pot,
        community_cards: encode_cards(&hand.community),
        deck: encode_cards(&hand.deck),
        action_deadline: hand.action_deadline,
        showdown_started_at: hand.showdown_started_at,
        last_runout_at: hand.last_runout_at,
        completed_at: hand.completed_at,
    };
    Hand::try_from(hands_adapter::write_hand(conn, dto).await?)
}

pub async fn delete_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand: &Hand,
) -> Result<(), DomainError> {
    hands_adapter::delete_hand(conn, hand.id, hand.version).await?;
    Ok(())
}
