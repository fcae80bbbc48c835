//! Local record store for trips and everything hanging off them.
//!
//! Every call takes the acting user's id and is refused unless that user owns
//! the trip involved. Child records live in per-type tables keyed by the
//! compound `(trip_id, id)`, so listing a trip's records is a range scan.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use uuid::Uuid;

use crate::error::{CalendarError, Result};
use crate::model::{
    parse_iso_date, Assignment, Person, Room, Transport, TransportType, Trip, TripSnapshot,
};
use crate::transport::parse_wall_clock;

/// Read side consumed by the layout pipeline.
pub trait TripStore {
    /// Load everything belonging to `trip_id` for `user_id`.
    fn snapshot(&self, trip_id: &str, user_id: &str) -> Result<TripSnapshot>;
}

#[derive(Debug, Clone, Default)]
pub struct NewTrip {
    pub name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub trip_id: String,
    pub room_id: String,
    pub person_id: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone)]
pub struct NewTransport {
    pub trip_id: String,
    pub person_id: String,
    pub transport_type: TransportType,
    pub datetime: String,
    pub location: String,
    pub transport_mode: Option<String>,
    pub driver_id: Option<String>,
    pub needs_pickup: bool,
}

trait TripRecord: Clone {
    const KIND: &'static str;
    fn id(&self) -> &str;
    fn trip_id(&self) -> &str;
}

macro_rules! trip_record {
    ($ty:ty, $kind:literal) => {
        impl TripRecord for $ty {
            const KIND: &'static str = $kind;
            fn id(&self) -> &str {
                &self.id
            }
            fn trip_id(&self) -> &str {
                &self.trip_id
            }
        }
    };
}

trip_record!(Room, "room");
trip_record!(Person, "person");
trip_record!(Assignment, "assignment");
trip_record!(Transport, "transport");

/// Rows keyed by `(trip_id, id)` plus an id → trip_id locator.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<(String, String), T>,
    locator: HashMap<String, String>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            locator: HashMap::new(),
        }
    }
}

impl<T: TripRecord> Table<T> {
    fn insert(&mut self, record: T) {
        self.locator
            .insert(record.id().to_string(), record.trip_id().to_string());
        self.rows
            .insert((record.trip_id().to_string(), record.id().to_string()), record);
    }

    fn trip_of(&self, id: &str) -> Result<&str> {
        self.locator
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| CalendarError::NotFound(format!("{} '{id}'", T::KIND)))
    }

    fn get(&self, trip_id: &str, id: &str) -> Option<&T> {
        self.rows.get(&(trip_id.to_string(), id.to_string()))
    }

    fn remove(&mut self, id: &str) -> Option<T> {
        let trip_id = self.locator.remove(id)?;
        self.rows.remove(&(trip_id, id.to_string()))
    }

    fn scan<'a>(&'a self, trip_id: &'a str) -> impl Iterator<Item = &'a T> + 'a {
        self.rows
            .range((trip_id.to_string(), String::new())..)
            .take_while(move |((t, _), _)| t == trip_id)
            .map(|(_, record)| record)
    }

    fn remove_trip(&mut self, trip_id: &str) -> usize {
        let ids: Vec<String> = self.scan(trip_id).map(|r| r.id().to_string()).collect();
        for id in &ids {
            self.remove(id);
        }
        ids.len()
    }
}

/// In-memory store with the same contract as the on-device database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    trips: BTreeMap<String, Trip>,
    rooms: Table<Room>,
    people: Table<Person>,
    assignments: Table<Assignment>,
    transports: Table<Transport>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── trips ───────────────────────────────────────────────────────────

    pub fn create_trip(&mut self, user_id: &str, new: NewTrip) -> Result<Trip> {
        validate_trip_dates(new.start_date.as_deref(), new.end_date.as_deref())?;
        let trip = Trip {
            id: new_id(),
            owner_id: user_id.to_string(),
            name: new.name,
            start_date: new.start_date,
            end_date: new.end_date,
        };
        self.trips.insert(trip.id.clone(), trip.clone());
        Ok(trip)
    }

    pub fn get_trip(&self, user_id: &str, trip_id: &str) -> Result<Trip> {
        self.owned_trip(user_id, trip_id).cloned()
    }

    /// Trips owned by `user_id`, by name.
    pub fn list_trips(&self, user_id: &str) -> Vec<Trip> {
        let mut trips: Vec<Trip> = self
            .trips
            .values()
            .filter(|trip| trip.owner_id == user_id)
            .cloned()
            .collect();
        trips.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        trips
    }

    /// Replace a trip's name and dates. Ownership cannot change.
    pub fn update_trip(&mut self, user_id: &str, trip: Trip) -> Result<Trip> {
        validate_trip_dates(trip.start_date.as_deref(), trip.end_date.as_deref())?;
        let existing = self.owned_trip(user_id, &trip.id)?;
        let updated = Trip {
            owner_id: existing.owner_id.clone(),
            ..trip
        };
        self.trips.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    /// Delete a trip and every record attached to it.
    pub fn delete_trip(&mut self, user_id: &str, trip_id: &str) -> Result<()> {
        self.owned_trip(user_id, trip_id)?;
        self.trips.remove(trip_id);
        let removed = self.rooms.remove_trip(trip_id)
            + self.people.remove_trip(trip_id)
            + self.assignments.remove_trip(trip_id)
            + self.transports.remove_trip(trip_id);
        debug!(trip_id, removed, "deleted trip and its records");
        Ok(())
    }

    // ── rooms & people ──────────────────────────────────────────────────

    pub fn add_room(&mut self, user_id: &str, trip_id: &str, name: &str) -> Result<Room> {
        self.owned_trip(user_id, trip_id)?;
        let room = Room {
            id: new_id(),
            trip_id: trip_id.to_string(),
            name: name.to_string(),
        };
        self.rooms.insert(room.clone());
        Ok(room)
    }

    pub fn list_rooms(&self, user_id: &str, trip_id: &str) -> Result<Vec<Room>> {
        self.owned_trip(user_id, trip_id)?;
        Ok(self.rooms.scan(trip_id).cloned().collect())
    }

    /// Delete a room. Assignments pointing at it are kept and render with a
    /// placeholder name.
    pub fn delete_room(&mut self, user_id: &str, room_id: &str) -> Result<()> {
        self.authorize(&self.rooms, user_id, room_id)?;
        self.rooms.remove(room_id);
        Ok(())
    }

    pub fn add_person(
        &mut self,
        user_id: &str,
        trip_id: &str,
        name: &str,
        color: &str,
    ) -> Result<Person> {
        self.owned_trip(user_id, trip_id)?;
        let person = Person {
            id: new_id(),
            trip_id: trip_id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.people.insert(person.clone());
        Ok(person)
    }

    pub fn list_people(&self, user_id: &str, trip_id: &str) -> Result<Vec<Person>> {
        self.owned_trip(user_id, trip_id)?;
        Ok(self.people.scan(trip_id).cloned().collect())
    }

    /// Delete a person. Their assignments and transports are kept and render
    /// with a placeholder name.
    pub fn delete_person(&mut self, user_id: &str, person_id: &str) -> Result<()> {
        self.authorize(&self.people, user_id, person_id)?;
        self.people.remove(person_id);
        Ok(())
    }

    // ── assignments ─────────────────────────────────────────────────────

    pub fn create_assignment(&mut self, user_id: &str, new: NewAssignment) -> Result<Assignment> {
        let assignment = Assignment {
            id: new_id(),
            trip_id: new.trip_id,
            room_id: new.room_id,
            person_id: new.person_id,
            start_date: new.start_date,
            end_date: new.end_date,
        };
        self.check_assignment(user_id, &assignment)?;
        self.assignments.insert(assignment.clone());
        Ok(assignment)
    }

    /// Replace an assignment's room, person and dates. It cannot move to
    /// another trip.
    pub fn update_assignment(
        &mut self,
        user_id: &str,
        assignment: Assignment,
    ) -> Result<Assignment> {
        let trip_id = self.authorize(&self.assignments, user_id, &assignment.id)?;
        if trip_id != assignment.trip_id {
            return Err(CalendarError::Conflict(format!(
                "assignment '{}' belongs to trip '{trip_id}'",
                assignment.id
            )));
        }
        self.check_assignment(user_id, &assignment)?;
        self.assignments.insert(assignment.clone());
        Ok(assignment)
    }

    pub fn delete_assignment(&mut self, user_id: &str, assignment_id: &str) -> Result<()> {
        self.authorize(&self.assignments, user_id, assignment_id)?;
        self.assignments.remove(assignment_id);
        Ok(())
    }

    /// A trip's assignments ordered by start date, then id.
    pub fn list_assignments(&self, user_id: &str, trip_id: &str) -> Result<Vec<Assignment>> {
        self.owned_trip(user_id, trip_id)?;
        let mut assignments: Vec<Assignment> = self.assignments.scan(trip_id).cloned().collect();
        assignments.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(assignments)
    }

    // ── transports ──────────────────────────────────────────────────────

    pub fn create_transport(&mut self, user_id: &str, new: NewTransport) -> Result<Transport> {
        self.owned_trip(user_id, &new.trip_id)?;
        if parse_wall_clock(&new.datetime).is_none() {
            return Err(CalendarError::InvalidDate(format!("'{}'", new.datetime)));
        }
        self.require_member(&self.people, &new.trip_id, &new.person_id)?;
        if let Some(driver_id) = new.driver_id.as_deref() {
            self.require_member(&self.people, &new.trip_id, driver_id)?;
        }
        let transport = Transport {
            id: new_id(),
            trip_id: new.trip_id,
            person_id: new.person_id,
            transport_type: new.transport_type,
            datetime: new.datetime,
            location: new.location,
            transport_mode: new.transport_mode,
            driver_id: new.driver_id,
            needs_pickup: new.needs_pickup,
        };
        self.transports.insert(transport.clone());
        Ok(transport)
    }

    pub fn delete_transport(&mut self, user_id: &str, transport_id: &str) -> Result<()> {
        self.authorize(&self.transports, user_id, transport_id)?;
        self.transports.remove(transport_id);
        Ok(())
    }

    /// A trip's transports ordered by datetime, then id.
    pub fn list_transports(&self, user_id: &str, trip_id: &str) -> Result<Vec<Transport>> {
        self.owned_trip(user_id, trip_id)?;
        let mut transports: Vec<Transport> = self.transports.scan(trip_id).cloned().collect();
        transports.sort_by(|a, b| {
            a.datetime
                .cmp(&b.datetime)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(transports)
    }

    // ── helpers ─────────────────────────────────────────────────────────

    fn owned_trip(&self, user_id: &str, trip_id: &str) -> Result<&Trip> {
        let trip = self
            .trips
            .get(trip_id)
            .ok_or_else(|| CalendarError::NotFound(format!("trip '{trip_id}'")))?;
        if trip.owner_id != user_id {
            return Err(CalendarError::Forbidden(format!(
                "user '{user_id}' does not own trip '{trip_id}'"
            )));
        }
        Ok(trip)
    }

    /// Resolve a record's trip and check `user_id` owns it.
    fn authorize<T: TripRecord>(
        &self,
        table: &Table<T>,
        user_id: &str,
        id: &str,
    ) -> Result<String> {
        let trip_id = table.trip_of(id)?.to_string();
        self.owned_trip(user_id, &trip_id)?;
        Ok(trip_id)
    }

    fn require_member<T: TripRecord>(
        &self,
        table: &Table<T>,
        trip_id: &str,
        id: &str,
    ) -> Result<()> {
        match table.get(trip_id, id) {
            Some(_) => Ok(()),
            None => Err(CalendarError::InvalidRecord(format!(
                "{} '{id}' is not part of trip '{trip_id}'",
                T::KIND
            ))),
        }
    }

    fn check_assignment(&self, user_id: &str, assignment: &Assignment) -> Result<()> {
        self.owned_trip(user_id, &assignment.trip_id)?;
        let start = parse_iso_date(&assignment.start_date)
            .ok_or_else(|| CalendarError::InvalidDate(format!("'{}'", assignment.start_date)))?;
        let end = parse_iso_date(&assignment.end_date)
            .ok_or_else(|| CalendarError::InvalidDate(format!("'{}'", assignment.end_date)))?;
        if end < start {
            return Err(CalendarError::InvalidRecord(format!(
                "assignment ends before it starts: {} > {}",
                assignment.start_date, assignment.end_date
            )));
        }
        self.require_member(&self.rooms, &assignment.trip_id, &assignment.room_id)?;
        self.require_member(&self.people, &assignment.trip_id, &assignment.person_id)
    }
}

impl TripStore for MemoryStore {
    fn snapshot(&self, trip_id: &str, user_id: &str) -> Result<TripSnapshot> {
        let trip = self.get_trip(user_id, trip_id)?;
        Ok(TripSnapshot {
            trip: Some(trip),
            rooms: self.list_rooms(user_id, trip_id)?,
            people: self.list_people(user_id, trip_id)?,
            assignments: self.list_assignments(user_id, trip_id)?,
            transports: self.list_transports(user_id, trip_id)?,
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn validate_trip_dates(start: Option<&str>, end: Option<&str>) -> Result<()> {
    let parse = |s: &str| {
        parse_iso_date(s).ok_or_else(|| CalendarError::InvalidDate(format!("'{s}'")))
    };
    let start = start.map(parse).transpose()?;
    let end = end.map(parse).transpose()?;
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(CalendarError::InvalidRecord(format!(
                "trip ends before it starts: {start} > {end}"
            )));
        }
    }
    Ok(())
}
