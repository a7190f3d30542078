//! In-memory keyspace with string and set values, expiry and snapshots.

pub mod command;
pub mod sweeper;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::CommandError;

pub use self::command::Command;

/// What a successful command answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The command has no output of its own.
    Ok,
    Values(Vec<String>),
}

impl Reply {
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Reply::Ok => vec!["OK".to_string()],
            Reply::Values(values) => values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Str(String),
    Set(BTreeSet<String>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Set(_) => "set",
        }
    }
}

fn deadline_after(now: Instant, ttl: Duration) -> Result<Instant, CommandError> {
    now.checked_add(ttl)
        .ok_or_else(|| CommandError::InvalidDuration(format!("{} seconds is too far away", ttl.as_secs())))
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    /// Expiry period; restarted whenever the value is overwritten with SET.
    ttl: Option<Duration>,
    deadline: Option<Instant>,
}

impl Entry {
    fn persistent(value: Value) -> Self {
        Self { value, ttl: None, deadline: None }
    }
}

/// Keys plus an index of their deadlines, ordered soonest first.
#[derive(Debug, Clone, Default)]
struct Keyspace {
    entries: HashMap<String, Entry>,
    deadlines: BTreeSet<(Instant, String)>,
}

impl Keyspace {
    /// Drop every key whose deadline is at or before `now`.
    fn purge_expired(&mut self, now: Instant) -> Vec<String> {
        let mut removed = Vec::new();
        while let Some((deadline, _)) = self.deadlines.first() {
            if *deadline > now {
                break;
            }
            if let Some((_, key)) = self.deadlines.pop_first() {
                self.entries.remove(&key);
                removed.push(key);
            }
        }
        removed
    }

    fn set_deadline(&mut self, key: &str, deadline: Option<Instant>) {
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        if let Some(old) = entry.deadline.take() {
            self.deadlines.remove(&(old, key.to_string()));
        }
        entry.deadline = deadline;
        if let Some(d) = deadline {
            self.deadlines.insert((d, key.to_string()));
        }
    }

    fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        if let Some(d) = entry.deadline {
            self.deadlines.remove(&(d, key.to_string()));
        }
        Some(entry)
    }

    fn set_members(&self, key: &str, command: &'static str) -> Result<&BTreeSet<String>, CommandError> {
        match self.entries.get(key).map(|e| &e.value) {
            Some(Value::Set(members)) => Ok(members),
            _ => Err(CommandError::WrongType { other: "string", command }),
        }
    }

    fn set(&mut self, key: String, value: String, now: Instant) -> Result<Reply, CommandError> {
        let Some(entry) = self.entries.get_mut(&key) else {
            self.entries.insert(key, Entry::persistent(Value::Str(value)));
            return Ok(Reply::Ok);
        };
        let Value::Str(current) = &mut entry.value else {
            return Err(CommandError::WrongType { other: "set", command: "SET" });
        };
        let restart = match entry.ttl {
            Some(ttl) => Some(deadline_after(now, ttl)?),
            None => None,
        };
        *current = value;
        if restart.is_some() {
            self.set_deadline(&key, restart);
        }
        Ok(Reply::Ok)
    }

    fn get(&self, key: &str) -> Result<Reply, CommandError> {
        match self.entries.get(key).map(|e| &e.value) {
            Some(Value::Str(value)) => Ok(Reply::Values(vec![value.clone()])),
            _ => Err(CommandError::WrongType { other: "set", command: "GET" }),
        }
    }

    fn sadd(&mut self, key: String, members: Vec<String>) -> Result<Reply, CommandError> {
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| Entry::persistent(Value::Set(BTreeSet::new())));
        match &mut entry.value {
            Value::Set(set) => {
                set.extend(members);
                Ok(Reply::Ok)
            }
            Value::Str(_) => Err(CommandError::WrongType { other: "string", command: "SADD" }),
        }
    }

    fn srem(&mut self, key: &str, members: &[String]) -> Result<Reply, CommandError> {
        match self.entries.get_mut(key).map(|e| &mut e.value) {
            Some(Value::Set(set)) => {
                for m in members {
                    set.remove(m);
                }
                Ok(Reply::Ok)
            }
            _ => Err(CommandError::WrongType { other: "string", command: "SREM" }),
        }
    }

    fn smembers(&self, key: &str) -> Result<Reply, CommandError> {
        let members = self.set_members(key, "SMEMBERS")?;
        Ok(Reply::Values(members.iter().cloned().collect()))
    }

    fn sinter(&self, keys: &[String]) -> Result<Reply, CommandError> {
        let mut sets = keys
            .iter()
            .map(|k| self.set_members(k, "SINTER"))
            .collect::<Result<Vec<_>, _>>()?;
        sets.sort_by_key(|s| s.len());
        let Some((smallest, rest)) = sets.split_first() else {
            return Ok(Reply::Values(Vec::new()));
        };
        let values = smallest
            .iter()
            .filter(|m| rest.iter().all(|s| s.contains(*m)))
            .cloned()
            .collect();
        Ok(Reply::Values(values))
    }

    fn keys(&self) -> Reply {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        Reply::Values(keys)
    }

    fn expire(&mut self, key: &str, seconds: i64, now: Instant) -> Result<Reply, CommandError> {
        if !self.entries.contains_key(key) {
            return Err(CommandError::KeyNotFound);
        }
        if seconds < 0 {
            self.remove(key);
            return Ok(Reply::Ok);
        }
        let ttl = (seconds > 0).then(|| Duration::from_secs(seconds.unsigned_abs()));
        let deadline = match ttl {
            Some(t) => Some(deadline_after(now, t)?),
            None => None,
        };
        if let Some(entry) = self.entries.get_mut(key) {
            entry.ttl = ttl;
        }
        self.set_deadline(key, deadline);
        Ok(Reply::Ok)
    }

    fn ttl(&self, key: &str, now: Instant) -> Result<Reply, CommandError> {
        let entry = self.entries.get(key).ok_or(CommandError::KeyNotFound)?;
        let deadline = entry.deadline.ok_or(CommandError::NoExpiration)?;
        let remaining = deadline.saturating_duration_since(now).as_secs();
        Ok(Reply::Values(vec![remaining.to_string()]))
    }
}

#[derive(Debug, Default)]
struct State {
    keyspace: Keyspace,
    snapshot: Option<Keyspace>,
}

impl State {
    fn execute(&mut self, cmd: Command, now: Instant) -> Result<Reply, CommandError> {
        self.keyspace.purge_expired(now);
        let ks = &mut self.keyspace;
        match cmd {
            Command::Set { key, value } => ks.set(key, value, now),
            Command::Get { key } => ks.get(&key),
            Command::SAdd { key, members } => ks.sadd(key, members),
            Command::SRem { key, members } => ks.srem(&key, &members),
            Command::SMembers { key } => ks.smembers(&key),
            Command::SInter { keys } => ks.sinter(&keys),
            Command::Keys => Ok(ks.keys()),
            Command::Del { key } => ks.remove(&key).map(|_| Reply::Ok).ok_or(CommandError::KeyNotFound),
            Command::Expire { key, seconds } => ks.expire(&key, seconds, now),
            Command::Ttl { key } => ks.ttl(&key, now),
            Command::Save => {
                self.snapshot = Some(self.keyspace.clone());
                Ok(Reply::Ok)
            }
            Command::Restore => {
                let snapshot = self.snapshot.take().ok_or(CommandError::NoSnapshot)?;
                self.keyspace = snapshot;
                self.keyspace.purge_expired(now);
                Ok(Reply::Ok)
            }
        }
    }
}

/// Shared handle to one keyspace. Clones refer to the same data.
#[derive(Debug, Clone, Default)]
pub struct Ledis {
    state: Arc<Mutex<State>>,
}

impl Ledis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and run one command line.
    pub async fn handle(&self, line: &str) -> Result<Reply, CommandError> {
        let cmd = Command::parse(line)?;
        log::debug!("command: {:?}", cmd);
        self.execute(cmd).await
    }

    pub async fn execute(&self, cmd: Command) -> Result<Reply, CommandError> {
        let mut state = self.state.lock().await;
        state.execute(cmd, Instant::now())
    }

    /// Remove expired keys now. Returns the removed key names.
    pub async fn sweep(&self) -> Vec<String> {
        let mut state = self.state.lock().await;
        state.keyspace.purge_expired(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(ledis: &Ledis, line: &str) -> Result<Vec<String>, String> {
        ledis
            .handle(line)
            .await
            .map(Reply::into_lines)
            .map_err(|e| e.to_string())
    }

    #[tokio::test]
    async fn test_set_get_and_overwrite() {
        let ledis = Ledis::new();
        assert_eq!(run(&ledis, "SET a 1").await.unwrap(), ["OK"]);
        assert_eq!(run(&ledis, "GET a").await.unwrap(), ["1"]);
        run(&ledis, "SET a 2").await.unwrap();
        assert_eq!(run(&ledis, "GET a").await.unwrap(), ["2"]);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let ledis = Ledis::new();
        assert_eq!(
            run(&ledis, "GET nope").await.unwrap_err(),
            "key is not valid, this key may be a set key and does not support GET command"
        );
    }

    #[tokio::test]
    async fn test_type_mismatch_leaves_value_intact() {
        let ledis = Ledis::new();
        run(&ledis, "SADD s x").await.unwrap();
        assert_eq!(
            run(&ledis, "SET s 1").await.unwrap_err(),
            "key is not valid, this key may be a set key and does not support SET command"
        );
        assert_eq!(run(&ledis, "SMEMBERS s").await.unwrap(), ["x"]);

        run(&ledis, "SET str v").await.unwrap();
        assert_eq!(
            run(&ledis, "SADD str x").await.unwrap_err(),
            "key is not valid, this key may be a string key and does not support SADD command"
        );
    }

    #[tokio::test]
    async fn test_set_operations() {
        let ledis = Ledis::new();
        run(&ledis, "SADD a 1 2 3 4").await.unwrap();
        run(&ledis, "SADD b 3 4 5").await.unwrap();
        run(&ledis, "SADD c 4 3").await.unwrap();
        assert_eq!(run(&ledis, "SINTER a b c").await.unwrap(), ["3", "4"]);
        assert_eq!(run(&ledis, "SINTER a").await.unwrap(), ["1", "2", "3", "4"]);

        run(&ledis, "SREM a 1 9").await.unwrap();
        assert_eq!(run(&ledis, "SMEMBERS a").await.unwrap(), ["2", "3", "4"]);

        run(&ledis, "SREM c 3 4").await.unwrap();
        assert!(run(&ledis, "SMEMBERS c").await.unwrap().is_empty());

        assert!(run(&ledis, "SINTER a missing").await.is_err());
    }

    #[tokio::test]
    async fn test_keys_and_del() {
        let ledis = Ledis::new();
        run(&ledis, "SET b 1").await.unwrap();
        run(&ledis, "SADD a x").await.unwrap();
        assert_eq!(run(&ledis, "KEYS").await.unwrap(), ["a", "b"]);
        assert_eq!(run(&ledis, "DEL a").await.unwrap(), ["OK"]);
        assert_eq!(run(&ledis, "DEL a").await.unwrap_err(), "key not found");
        assert_eq!(run(&ledis, "KEYS").await.unwrap(), ["b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_and_ttl() {
        let ledis = Ledis::new();
        run(&ledis, "SET k v").await.unwrap();
        assert_eq!(run(&ledis, "TTL k").await.unwrap_err(), "key has no expiration time");
        assert_eq!(run(&ledis, "EXPIRE missing 5").await.unwrap_err(), "key not found");

        run(&ledis, "EXPIRE k 10").await.unwrap();
        assert_eq!(run(&ledis, "TTL k").await.unwrap(), ["10"]);

        tokio::time::advance(Duration::from_millis(3500)).await;
        assert_eq!(run(&ledis, "TTL k").await.unwrap(), ["6"]);

        tokio::time::advance(Duration::from_secs(7)).await;
        assert!(run(&ledis, "GET k").await.is_err());
        assert!(run(&ledis, "KEYS").await.unwrap().is_empty());
        assert_eq!(run(&ledis, "TTL k").await.unwrap_err(), "key not found");
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_restarts_ttl_countdown() {
        let ledis = Ledis::new();
        run(&ledis, "SET k v").await.unwrap();
        run(&ledis, "EXPIRE k 5").await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        run(&ledis, "SET k w").await.unwrap();
        assert_eq!(run(&ledis, "TTL k").await.unwrap(), ["5"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_zero_and_negative() {
        let ledis = Ledis::new();
        run(&ledis, "SET k v").await.unwrap();
        run(&ledis, "EXPIRE k 5").await.unwrap();
        run(&ledis, "EXPIRE k 0").await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(run(&ledis, "GET k").await.unwrap(), ["v"]);

        run(&ledis, "EXPIRE k -1").await.unwrap();
        assert!(run(&ledis, "KEYS").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expire_beyond_clock_range_is_rejected() {
        let ledis = Ledis::new();
        run(&ledis, "SET k v").await.unwrap();
        assert_eq!(
            run(&ledis, "EXPIRE k 9223372036854775807").await.unwrap_err(),
            "invalid duration: 9223372036854775807 seconds is too far away"
        );
        // the key is untouched and still writable
        assert_eq!(run(&ledis, "TTL k").await.unwrap_err(), "key has no expiration time");
        assert_eq!(run(&ledis, "SET k w").await.unwrap(), ["OK"]);
        assert_eq!(run(&ledis, "GET k").await.unwrap(), ["w"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let ledis = Ledis::new();
        run(&ledis, "SET short 1").await.unwrap();
        run(&ledis, "SET long 2").await.unwrap();
        run(&ledis, "SET forever 3").await.unwrap();
        run(&ledis, "EXPIRE short 1").await.unwrap();
        run(&ledis, "EXPIRE long 60").await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(ledis.sweep().await, ["short"]);
        assert!(ledis.sweep().await.is_empty());
        assert_eq!(run(&ledis, "KEYS").await.unwrap(), ["forever", "long"]);
    }

    #[tokio::test]
    async fn test_save_and_restore() {
        let ledis = Ledis::new();
        assert_eq!(
            run(&ledis, "RESTORE").await.unwrap_err(),
            "failed to restore: no snapshot saved"
        );

        run(&ledis, "SET a 1").await.unwrap();
        run(&ledis, "SADD s x y").await.unwrap();
        run(&ledis, "SAVE").await.unwrap();

        run(&ledis, "SET a 2").await.unwrap();
        run(&ledis, "SREM s x").await.unwrap();
        run(&ledis, "SET b 3").await.unwrap();

        assert_eq!(run(&ledis, "RESTORE").await.unwrap(), ["OK"]);
        assert_eq!(run(&ledis, "GET a").await.unwrap(), ["1"]);
        assert_eq!(run(&ledis, "SMEMBERS s").await.unwrap(), ["x", "y"]);
        assert_eq!(run(&ledis, "KEYS").await.unwrap(), ["a", "s"]);

        // the snapshot is consumed
        assert!(run(&ledis, "RESTORE").await.is_err());
    }
}
