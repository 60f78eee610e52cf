//! Named queue groupings owned by an actor (ยง3.4, ยง4.2).

// Layer 1: Standard library
use std::fmt;

// Layer 2: Third-party
use dashmap::DashMap;

// Layer 3: Internal
use super::Queue;
use crate::error::FrameworkException;

/// Which named grouping a queue belongs to within an actor's `QueuePool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueGroup {
    /// Queues an actor consumes from.
    Inbound,
    /// Queues an actor's successful output is sent to by default.
    Outbound,
    /// Queues a failed event is routed to (ยง4.5.3 step 5).
    Error,
    /// Queues carrying `Event::log` entries (ยง3.1 Supplemental).
    Logs,
}

impl fmt::Display for QueueGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueueGroup::Inbound => "inbound",
            QueueGroup::Outbound => "outbound",
            QueueGroup::Error => "error",
            QueueGroup::Logs => "logs",
        };
        write!(f, "{name}")
    }
}

/// Name of the placeholder `logs`-group queue every `QueuePool` owns from
/// construction (ยง3.4 "at most one entry, for log events").
pub const DEFAULT_LOG_QUEUE_NAME: &str = "logs";

/// An actor's four named queue groupings: `inbound`, `outbound`, `error`,
/// `logs` (ยง3.4). Keys are unique per group — concurrent access uses
/// `dashmap`, matching this codebase's established registry pattern.
pub struct QueuePool {
    default_size: usize,
    inbound: DashMap<String, Queue>,
    outbound: DashMap<String, Queue>,
    error: DashMap<String, Queue>,
    logs: DashMap<String, Queue>,
}

impl QueuePool {
    /// Create an empty pool; queues created via `add` without an explicit
    /// `Queue` default to `default_size` capacity. A placeholder queue named
    /// [`DEFAULT_LOG_QUEUE_NAME`] is pre-registered in the `logs` group.
    pub fn new(default_size: usize) -> Self {
        let logs = DashMap::new();
        logs.insert(
            DEFAULT_LOG_QUEUE_NAME.to_string(),
            Queue::new(DEFAULT_LOG_QUEUE_NAME, default_size),
        );

        Self {
            default_size,
            inbound: DashMap::new(),
            outbound: DashMap::new(),
            error: DashMap::new(),
            logs,
        }
    }

    fn group(&self, group: QueueGroup) -> &DashMap<String, Queue> {
        match group {
            QueueGroup::Inbound => &self.inbound,
            QueueGroup::Outbound => &self.outbound,
            QueueGroup::Error => &self.error,
            QueueGroup::Logs => &self.logs,
        }
    }

    /// Register `name` in `group`, creating a `Queue` of `default_size` if
    /// `queue` is not supplied. Idempotent if the same `Queue` is already
    /// registered under that name; fails with `QueueConnected` if a
    /// different queue already occupies the name (ยง4.2).
    pub fn add(
        &self,
        group: QueueGroup,
        name: impl Into<String>,
        queue: Option<Queue>,
    ) -> Result<Queue, FrameworkException> {
        let name = name.into();
        let map = self.group(group);

        if let Some(existing) = map.get(&name) {
            return match &queue {
                Some(q) if q.name() == existing.name() && same_queue(q, &existing) => {
                    Ok(existing.clone())
                }
                None => Ok(existing.clone()),
                Some(_) => Err(FrameworkException::QueueConnected { name }),
            };
        }

        let queue = queue.unwrap_or_else(|| Queue::new(name.clone(), self.default_size));
        map.insert(name, queue.clone());
        Ok(queue)
    }

    /// Look up a queue by group and name.
    pub fn get(&self, group: QueueGroup, name: &str) -> Option<Queue> {
        self.group(group).get(name).map(|q| q.clone())
    }

    /// All queues currently registered in `group`.
    pub fn all(&self, group: QueueGroup) -> Vec<Queue> {
        self.group(group).iter().map(|e| e.value().clone()).collect()
    }

    /// True if `group` has no queues registered yet.
    pub fn is_empty(&self, group: QueueGroup) -> bool {
        self.group(group).is_empty()
    }

    /// True if the `logs` group still holds only its construction-time
    /// placeholder — i.e. nothing has wired this actor's logs anywhere yet
    /// (ยง3.4, ยง4.4 "Default connection rule"). Unlike the other three
    /// groups, `logs` is never actually empty, so the default-connection
    /// check can't use [`QueuePool::is_empty`] here.
    pub fn has_unwired_logs(&self) -> bool {
        self.logs.len() <= 1 && self.logs.contains_key(DEFAULT_LOG_QUEUE_NAME)
    }
}

fn same_queue(a: &Queue, b: &Queue) -> bool {
    a.name() == b.name() && a.max_size() == b.max_size()
}

/// Attach the `src_queue_name` queue in `src_group` on `src` to the
/// `dst_queue_name` inbound queue on `dst` (ยง4.2, ยง4.4).
///
/// If neither side has a queue under that name, one is created and shared.
/// If both sides already have (possibly different) queues, the destination's
/// inbound entry is reassigned to the source queue (fan-in): the two ends end
/// up sharing a single `Queue`. With `check_existing=true`, an attempt to
/// reuse a name that already maps to a *different* queue object on the
/// destination side fails with `QueueConnected`.
pub fn connect_group(
    src: &QueuePool,
    src_group: QueueGroup,
    src_queue_name: &str,
    dst: &QueuePool,
    dst_queue_name: &str,
    check_existing: bool,
) -> Result<Queue, FrameworkException> {
    let shared = match src.get(src_group, src_queue_name) {
        Some(queue) => queue,
        None => src.add(src_group, src_queue_name, None)?,
    };

    if let Some(existing) = dst.get(QueueGroup::Inbound, dst_queue_name) {
        if same_queue(&existing, &shared) {
            return Ok(existing);
        }
        if check_existing {
            return Err(FrameworkException::QueueConnected {
                name: dst_queue_name.to_string(),
            });
        }
    }

    dst.inbound.insert(dst_queue_name.to_string(), shared.clone());
    Ok(shared)
}

/// Attach the `src_queue_name` outbound queue on `src` to the
/// `dst_queue_name` inbound queue on `dst` (ยง4.2). Thin wrapper over
/// [`connect_group`] fixed to [`QueueGroup::Outbound`], the everyday
/// actor-to-actor wiring path.
pub fn connect_queue(
    src: &QueuePool,
    src_queue_name: &str,
    dst: &QueuePool,
    dst_queue_name: &str,
    check_existing: bool,
) -> Result<Queue, FrameworkException> {
    connect_group(src, QueueGroup::Outbound, src_queue_name, dst, dst_queue_name, check_existing)
}

/// Attach `src`'s error group to `dst`'s inbound group (ยง4.4
/// `connect_error_queue`).
pub fn connect_error_queue(
    src: &QueuePool,
    src_queue_name: &str,
    dst: &QueuePool,
    dst_queue_name: &str,
    check_existing: bool,
) -> Result<Queue, FrameworkException> {
    connect_group(
        src,
        QueueGroup::Error,
        src_queue_name,
        dst,
        dst_queue_name,
        check_existing,
    )
}

/// Attach `src`'s logs group to `dst`'s inbound group (ยง4.4
/// `connect_log_queue`).
pub fn connect_log_queue(
    src: &QueuePool,
    src_queue_name: &str,
    dst: &QueuePool,
    dst_queue_name: &str,
    check_existing: bool,
) -> Result<Queue, FrameworkException> {
    connect_group(
        src,
        QueueGroup::Logs,
        src_queue_name,
        dst,
        dst_queue_name,
        check_existing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pool_has_placeholder_log_queue() {
        let pool = QueuePool::new(5);
        assert!(!pool.is_empty(QueueGroup::Logs));
        assert!(pool.get(QueueGroup::Logs, DEFAULT_LOG_QUEUE_NAME).is_some());
        assert!(pool.has_unwired_logs());
    }

    #[test]
    fn test_has_unwired_logs_turns_false_once_another_entry_is_added() {
        let pool = QueuePool::new(5);
        pool.add(QueueGroup::Logs, "custom", None).unwrap();
        assert!(!pool.has_unwired_logs());
    }

    #[test]
    fn test_add_creates_default_queue() {
        let pool = QueuePool::new(5);
        let queue = pool.add(QueueGroup::Inbound, "in", None).unwrap();
        assert_eq!(queue.max_size(), 5);
        assert_eq!(queue.name(), "in");
    }

    #[test]
    fn test_add_idempotent_on_same_name_reuse() {
        let pool = QueuePool::new(5);
        pool.add(QueueGroup::Inbound, "in", None).unwrap();
        let again = pool.add(QueueGroup::Inbound, "in", None).unwrap();
        assert_eq!(again.name(), "in");
    }

    #[test]
    fn test_add_collision_with_different_queue_fails() {
        let pool = QueuePool::new(5);
        pool.add(QueueGroup::Inbound, "in", None).unwrap();

        let other = Queue::new("in", 99);
        let err = pool.add(QueueGroup::Inbound, "in", Some(other)).unwrap_err();
        assert!(matches!(err, FrameworkException::QueueConnected { .. }));
    }

    #[test]
    fn test_connect_queue_creates_shared_queue_when_absent() {
        let upstream = QueuePool::new(5);
        let downstream = QueuePool::new(5);

        let shared = connect_queue(&upstream, "out", &downstream, "in", true).unwrap();
        assert_eq!(
            upstream.get(QueueGroup::Outbound, "out").unwrap().name(),
            shared.name()
        );
        assert_eq!(
            downstream.get(QueueGroup::Inbound, "in").unwrap().name(),
            shared.name()
        );
    }

    #[test]
    fn test_connect_queue_rejects_existing_different_queue() {
        let upstream = QueuePool::new(5);
        let downstream = QueuePool::new(5);
        downstream
            .add(QueueGroup::Inbound, "in", Some(Queue::new("in", 1)))
            .unwrap();

        let err = connect_queue(&upstream, "out", &downstream, "in", true).unwrap_err();
        assert!(matches!(err, FrameworkException::QueueConnected { .. }));
    }

    #[test]
    fn test_connect_queue_fan_in_without_check_existing() {
        let upstream = QueuePool::new(5);
        let downstream = QueuePool::new(5);
        downstream
            .add(QueueGroup::Inbound, "in", Some(Queue::new("in", 1)))
            .unwrap();

        let shared = connect_queue(&upstream, "out", &downstream, "in", false).unwrap();
        assert_eq!(
            downstream.get(QueueGroup::Inbound, "in").unwrap().max_size(),
            shared.max_size()
        );
    }

    #[test]
    fn test_connect_error_queue_wires_error_group_to_inbound() {
        let upstream = QueuePool::new(5);
        let downstream = QueuePool::new(5);

        let shared = connect_error_queue(&upstream, "errors", &downstream, "in", true).unwrap();
        assert_eq!(
            upstream.get(QueueGroup::Error, "errors").unwrap().name(),
            shared.name()
        );
        assert_eq!(
            downstream.get(QueueGroup::Inbound, "in").unwrap().name(),
            shared.name()
        );
        assert!(upstream.get(QueueGroup::Outbound, "errors").is_none());
    }

    #[test]
    fn test_connect_log_queue_wires_logs_group_to_inbound() {
        let upstream = QueuePool::new(5);
        let downstream = QueuePool::new(5);

        let shared = connect_log_queue(&upstream, "logs", &downstream, "in", true).unwrap();
        assert_eq!(
            upstream.get(QueueGroup::Logs, "logs").unwrap().name(),
            shared.name()
        );
        assert_eq!(
            downstream.get(QueueGroup::Inbound, "in").unwrap().name(),
            shared.name()
        );
    }
}
