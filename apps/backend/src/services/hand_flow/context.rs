//! A loaded live hand: table, hand and every seat, mutated in memory and
//! written back with version checks.

use sea_orm::ConnectionTrait;
use serde_json::Value;

use crate::domain::pots::{calculate_pots, Contribution, PotLayer};
use crate::domain::turn_order::{SeatView, SeatingShape};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::actions::{self, ActionRecord, NewAction};
use crate::repos::events::EventRecord;
use crate::repos::hands::{self, Hand};
use crate::repos::seats::{self, Seat};
use crate::repos::tables::{self, PokerTable};
use crate::services::sync;

pub(crate) struct HandContext {
    pub table: PokerTable,
    pub hand: Hand,
    pub seats: Vec<Seat>,
    loaded_seats: Vec<Seat>,
}

impl HandContext {
    /// Load the table's live hand, if there is one.
    pub async fn load<C: ConnectionTrait + Send + Sync>(
        conn: &C,
        table_id: i64,
    ) -> Result<Option<Self>, DomainError> {
        let table = tables::require_table(conn, table_id).await?;
        let Some(hand) = hands::find_live_for_table(conn, table_id).await? else {
            return Ok(None);
        };
        let seats = seats::find_all_by_table(conn, table_id).await?;
        Ok(Some(Self {
            table,
            hand,
            loaded_seats: seats.clone(),
            seats,
        }))
    }

    /// Seats dealt into this hand, in seat order.
    pub fn views(&self) -> Vec<SeatView> {
        self.seats
            .iter()
            .filter(|s| s.is_dealt_in())
            .map(Seat::view)
            .collect()
    }

    pub fn dealt_in(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.is_dealt_in())
    }

    pub fn dealt_in_mut(&mut self) -> impl Iterator<Item = &mut Seat> {
        self.seats.iter_mut().filter(|s| s.is_dealt_in())
    }

    pub fn shape(&self) -> SeatingShape {
        SeatingShape::for_players(self.dealt_in().count())
    }

    pub fn seat(&self, seat_index: u8) -> Result<&Seat, DomainError> {
        self.seats
            .iter()
            .find(|s| s.seat_index == seat_index)
            .ok_or_else(|| missing_seat(self.table.id, seat_index))
    }

    pub fn seat_mut(&mut self, seat_index: u8) -> Result<&mut Seat, DomainError> {
        let table_id = self.table.id;
        self.seats
            .iter_mut()
            .find(|s| s.seat_index == seat_index)
            .ok_or_else(|| missing_seat(table_id, seat_index))
    }

    pub fn contributions(&self) -> Vec<Contribution> {
        self.dealt_in()
            .map(|s| Contribution {
                seat: s.seat_index,
                amount: s.total_contributed,
                folded: !s.status.is_in_hand(),
            })
            .collect()
    }

    /// Dead money (antes) in the pot that no seat's contribution accounts for.
    pub fn carried(&self) -> i64 {
        let attributed: i64 = self.dealt_in().map(|s| s.total_contributed).sum();
        (self.hand.pot - attributed).max(0)
    }

    pub fn pot_layers(&self) -> Vec<PotLayer> {
        calculate_pots(&self.contributions(), self.carried())
    }

    /// Give the turn to `actor` and arm the table's turn clock.
    pub fn set_actor(&mut self, actor: Option<u8>, now: time::OffsetDateTime) {
        self.hand.current_actor = actor;
        self.hand.action_deadline = match (actor, self.table.turn_timeout()) {
            (Some(_), Some(timeout)) => Some(now + timeout),
            _ => None,
        };
    }

    pub async fn record<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        action: NewAction,
        now: time::OffsetDateTime,
    ) -> Result<ActionRecord, DomainError> {
        actions::append(conn, self.hand.id, action, now).await
    }

    /// Write back seats that changed since load.
    pub async fn persist_seats<C: ConnectionTrait + Send + Sync>(
        &mut self,
        conn: &C,
    ) -> Result<(), DomainError> {
        for seat in self.seats.iter_mut() {
            if self.loaded_seats.iter().any(|loaded| loaded == seat) {
                continue;
            }
            *seat = seats::write_seat(conn, seat).await?;
        }
        self.loaded_seats = self.seats.clone();
        Ok(())
    }

    pub async fn persist<C: ConnectionTrait + Send + Sync>(
        &mut self,
        conn: &C,
    ) -> Result<(), DomainError> {
        self.hand = hands::write_hand(conn, &self.hand).await?;
        self.persist_seats(conn).await
    }

    /// Persist, then record an event at the next table version.
    pub async fn emit<C: ConnectionTrait + Send + Sync>(
        &mut self,
        conn: &C,
        event_type: &str,
        data: Value,
    ) -> Result<EventRecord, DomainError> {
        self.persist(conn).await?;
        let update = self.table.touch();
        sync::emit(conn, &mut self.table, update, event_type, data).await
    }
}

fn missing_seat(table_id: i64, seat_index: u8) -> DomainError {
    DomainError::not_found(
        NotFoundKind::Seat,
        format!("Seat {seat_index} not found at table {table_id}"),
    )
}
