//! Host application boundary
//!
//! The engine never reaches into a host application directly. It sees
//! documents only through these traits, each handed in explicitly:
//! - [`HostDocument`]: links, levels and plan views of the document being annotated
//! - [`LinkedDocument`]: levels and rooms of a read-only linked document
//! - [`LinkedSources`]: resolves a link's target handle to a loaded document
//! - [`TagPlacer`]: creates one room tag per request
//! - [`Transactional`]: the host's single mutable-state scope
//!
//! Queries return already-typed snapshots; filtering raw element collections
//! is the implementor's concern.

use crate::error::{PlacementError, TransactionError};
use crate::ids::{DocumentRef, TagId};
use crate::model::{Level, Link, PlacementRequest, PlanView, Room, ViewKind};

/// Document receiving tags
pub trait HostDocument {
    /// Handle of this document
    fn document(&self) -> DocumentRef;

    /// Link instances, in host enumeration order
    fn list_links(&self) -> Vec<Link>;

    /// Host levels
    fn list_levels(&self) -> Vec<Level>;

    /// Plan views of the requested kinds, in host enumeration order
    fn list_plan_views(&self, kinds: &[ViewKind]) -> Vec<PlanView>;
}

/// Read-only document supplying rooms
pub trait LinkedDocument {
    /// Handle of this document
    fn document(&self) -> DocumentRef;

    /// Linked levels
    fn list_levels(&self) -> Vec<Level>;

    /// Placed rooms with level, phase, location and boundary filled in
    fn list_rooms(&self) -> Vec<Room>;
}

impl<T: LinkedDocument + ?Sized> LinkedDocument for Box<T> {
    fn document(&self) -> DocumentRef {
        (**self).document()
    }

    fn list_levels(&self) -> Vec<Level> {
        (**self).list_levels()
    }

    fn list_rooms(&self) -> Vec<Room> {
        (**self).list_rooms()
    }
}

/// Resolves link targets to loaded linked documents
pub trait LinkedSources {
    /// Loaded document for `document`, if any
    fn resolve(&self, document: &DocumentRef) -> Option<&dyn LinkedDocument>;
}

impl<T: LinkedDocument> LinkedSources for [T] {
    fn resolve(&self, document: &DocumentRef) -> Option<&dyn LinkedDocument> {
        self.iter()
            .find(|doc| doc.document() == *document)
            .map(|doc| doc as &dyn LinkedDocument)
    }
}

impl<T: LinkedDocument> LinkedSources for Vec<T> {
    fn resolve(&self, document: &DocumentRef) -> Option<&dyn LinkedDocument> {
        self.as_slice().resolve(document)
    }
}

/// Creates room tags in the host
#[cfg_attr(test, mockall::automock)]
pub trait TagPlacer {
    /// Create one tag for `request.room_id`, seen through `link`, in
    /// `request.view_id` at `request.point` (host coordinates)
    ///
    /// # Errors
    /// Any [`PlacementError`]; the caller records it and carries on.
    fn create_tag(&mut self, link: &Link, request: &PlacementRequest) -> Result<TagId, PlacementError>;
}

/// Host mutable-state scope
///
/// Only [`run_in_transaction`] should drive these directly.
pub trait Transactional {
    /// Open a transaction
    ///
    /// # Errors
    /// `TransactionError::Begin` if the host refuses.
    fn begin(&mut self, label: &str) -> Result<(), TransactionError>;

    /// Keep all changes made since `begin`
    ///
    /// # Errors
    /// `TransactionError::Commit` if the host rejects the changes.
    fn commit(&mut self) -> Result<(), TransactionError>;

    /// Discard all changes made since `begin`
    fn rollback(&mut self);
}

/// Open transaction that rolls back unless committed
struct TransactionGuard<'h, H: Transactional + ?Sized> {
    host: &'h mut H,
    finished: bool,
}

impl<'h, H: Transactional + ?Sized> TransactionGuard<'h, H> {
    fn begin(host: &'h mut H, label: &str) -> Result<Self, TransactionError> {
        host.begin(label)?;
        Ok(Self {
            host,
            finished: false,
        })
    }

    fn host(&mut self) -> &mut H {
        &mut *self.host
    }

    fn commit(mut self) -> Result<(), TransactionError> {
        self.host.commit()?;
        self.finished = true;
        Ok(())
    }

    fn rollback(mut self) {
        self.host.rollback();
        self.finished = true;
    }
}

impl<H: Transactional + ?Sized> Drop for TransactionGuard<'_, H> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("transaction not finished, rolling back");
            self.host.rollback();
        }
    }
}

/// Run `body` inside one host transaction
///
/// Commits when `body` returns `Ok`; rolls back when it returns `Err`, when
/// the commit itself is rejected, or when `body` unwinds.
///
/// # Errors
/// The error from `body`, or a [`TransactionError`] from `begin`/`commit`.
pub fn run_in_transaction<H, T, E, F>(host: &mut H, label: &str, body: F) -> Result<T, E>
where
    H: Transactional + ?Sized,
    E: From<TransactionError>,
    F: FnOnce(&mut H) -> Result<T, E>,
{
    let mut guard = TransactionGuard::begin(host, label)?;
    tracing::debug!(label, "transaction started");

    match body(guard.host()) {
        Ok(value) => {
            guard.commit()?;
            tracing::debug!(label, "transaction committed");
            Ok(value)
        }
        Err(e) => {
            guard.rollback();
            tracing::debug!(label, "transaction rolled back");
            Err(e)
        }
    }
}
