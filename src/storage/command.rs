//! Command-line parsing and arity validation for the keyspace.

use crate::error::CommandError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Get { key: String },
    SAdd { key: String, members: Vec<String> },
    SRem { key: String, members: Vec<String> },
    SMembers { key: String },
    SInter { keys: Vec<String> },
    Keys,
    Del { key: String },
    Expire { key: String, seconds: i64 },
    Ttl { key: String },
    Save,
    Restore,
}

impl Command {
    /// Parse one command line. The name is case-insensitive; arguments are kept verbatim.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(CommandError::Empty)?.to_ascii_uppercase();
        let args: Vec<String> = parts.map(str::to_string).collect();

        let cmd = match name.as_str() {
            "SET" => {
                let [key, value] = exact::<2>(args, "SET", "SET key value")?;
                Command::Set { key, value }
            }
            "GET" => {
                let [key] = exact::<1>(args, "GET", "GET key")?;
                Command::Get { key }
            }
            "SADD" => {
                let (key, members) = key_and_members(args, "SADD", "SADD key value1 [value2...]")?;
                Command::SAdd { key, members }
            }
            "SREM" => {
                let (key, members) = key_and_members(args, "SREM", "SREM key value1 [value2...]")?;
                Command::SRem { key, members }
            }
            "SMEMBERS" => {
                let [key] = exact::<1>(args, "SMEMBERS", "SMEMBERS key")?;
                Command::SMembers { key }
            }
            "SINTER" => {
                if args.is_empty() {
                    return Err(usage("SINTER", "SINTER key1 [key2] ..."));
                }
                Command::SInter { keys: args }
            }
            "KEYS" => {
                exact::<0>(args, "KEYS", "KEYS")?;
                Command::Keys
            }
            "DEL" => {
                let [key] = exact::<1>(args, "DEL", "DEL key")?;
                Command::Del { key }
            }
            "EXPIRE" => {
                let [key, seconds] = exact::<2>(args, "EXPIRE", "EXPIRE key seconds")?;
                let seconds = seconds
                    .parse::<i64>()
                    .map_err(|e| CommandError::InvalidDuration(e.to_string()))?;
                Command::Expire { key, seconds }
            }
            "TTL" => {
                let [key] = exact::<1>(args, "TTL", "TTL key")?;
                Command::Ttl { key }
            }
            "SAVE" => {
                exact::<0>(args, "SAVE", "SAVE")?;
                Command::Save
            }
            "RESTORE" => {
                exact::<0>(args, "RESTORE", "RESTORE")?;
                Command::Restore
            }
            _ => return Err(CommandError::Unknown),
        };
        Ok(cmd)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Set { .. } => "SET",
            Command::Get { .. } => "GET",
            Command::SAdd { .. } => "SADD",
            Command::SRem { .. } => "SREM",
            Command::SMembers { .. } => "SMEMBERS",
            Command::SInter { .. } => "SINTER",
            Command::Keys => "KEYS",
            Command::Del { .. } => "DEL",
            Command::Expire { .. } => "EXPIRE",
            Command::Ttl { .. } => "TTL",
            Command::Save => "SAVE",
            Command::Restore => "RESTORE",
        }
    }
}

fn usage(name: &'static str, usage: &'static str) -> CommandError {
    CommandError::Usage { name, usage }
}

fn exact<const N: usize>(
    args: Vec<String>,
    name: &'static str,
    form: &'static str,
) -> Result<[String; N], CommandError> {
    args.try_into().map_err(|_| usage(name, form))
}

fn key_and_members(
    mut args: Vec<String>,
    name: &'static str,
    form: &'static str,
) -> Result<(String, Vec<String>), CommandError> {
    if args.len() < 2 {
        return Err(usage(name, form));
    }
    let members = args.split_off(1);
    let key = args.remove(0);
    Ok((key, members))
}
