//! The interactive command table (component C10). Each line the REPL reads
//! is parsed and dispatched here; this is the direct replacement for the
//! upstream `commands.c` dispatch table, minus its readline completion glue
//! (explicitly out of scope).

use crate::driver;
use crate::globals::Globals;
use crate::scan::{DataType, MatchRelation};
use crate::sets::parse_uintset;
use crate::target::Target;
use crate::value::{parse_uservalue_bytearray, parse_uservalue_number, parse_uservalue_string, UserValue};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// What the REPL should do after running one line.
pub enum Outcome {
    /// Print this (possibly empty) message and read another line.
    Continue(String),
    /// Leave the loop. The target, if attached, has already been detached.
    Quit,
}

fn ok(msg: impl Into<String>) -> Outcome {
    Outcome::Continue(msg.into())
}

fn err(msg: impl std::fmt::Display) -> Outcome {
    Outcome::Continue(format!("error: {msg}"))
}

pub const HELP_TEXT: &str = "\
pid N                     attach to process N
reset                     drop matches, re-enumerate regions
snapshot                  initial scan capturing every byte
N                         initial/narrowing scan for literal N
> [N]                     increased, or greater-than N if given
< [N]                     decreased, or less-than N if given
=                         unchanged since the last scan
!=                        changed since the last scan
+ N                       increased by N
- N                       decreased by N
\" text                   string scan\n\
update                    refresh old values without filtering
list                      show surviving matches
lregions                  list enumerated regions
delete ID                 drop match ID without shrinking storage
dregion SET               drop regions (and their matches); SET uses [!]n(,n|a..b)*
set [IDS=]V[/DELAY]       write V to matches IDS (default: all), repeat every DELAY seconds
watch ID                  print a line each time match ID's value changes
dump ADDR LEN [FILE]      read target memory to stdout or FILE
write TYPE ADDR V         typed write: i8/i16/i32/i64/f32/f64/bytearray/string
option KEY VALUE          set scan_data_type/region_scan_level/detect_reverse_change/dump_with_ascii
help                      show this text
quit / exit               leave the program";

/// Parse and run one line. Never panics on malformed input; reports an
/// error message and leaves `globals` untouched on the failing path where
/// that's feasible.
pub fn execute(globals: &mut Globals, line: &str) -> Outcome {
    let line = line.trim();
    if line.is_empty() {
        return ok("");
    }

    if let Some(rest) = line.strip_prefix('"') {
        return scan_string(globals, rest);
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or("");
    let tail = parts.next().unwrap_or("").trim();

    match head {
        "quit" | "exit" => {
            if let Some(target) = globals.target.take() {
                let _ = target.detach();
            }
            Outcome::Quit
        }
        "help" => ok(HELP_TEXT),
        "pid" => cmd_pid(globals, tail),
        "reset" => cmd_reset(globals),
        "snapshot" => cmd_snapshot(globals),
        "update" => cmd_update(globals),
        "list" => cmd_list(globals),
        "lregions" => cmd_lregions(globals),
        "delete" => cmd_delete(globals, tail),
        "dregion" => cmd_dregion(globals, tail),
        "set" => cmd_set(globals, tail),
        "watch" => cmd_watch(globals, tail),
        "dump" => cmd_dump(globals, tail),
        "write" => cmd_write(globals, tail),
        "option" => cmd_option(globals, tail),
        ">" | "<" | "=" | "!=" | "+" | "-" => cmd_relation(globals, head, tail),
        _ => scan_relation_prefix(globals, line),
    }
}

/// Lines that aren't a known keyword token are parsed as a literal `EQUALTO`
/// scan, in the form the current `scan_data_type` expects: a number for any
/// numeric type, whitespace-separated hex/wildcard tokens for `ByteArray`,
/// and (for `String`, which needs quoting to admit embedded whitespace) a
/// redirect to the `"` command. Unlike `>`/`<`/`+`/`-`, which only trigger
/// their relation as an exact, separately-tokenized word, a glued form like
/// `-5` is just a negative literal and never the `-` (decreased) command.
fn scan_relation_prefix(globals: &mut Globals, line: &str) -> Outcome {
    match globals.options.scan_data_type {
        DataType::ByteArray => {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match parse_uservalue_bytearray(&tokens) {
                Ok(uv) => run_scan(globals, DataType::ByteArray, MatchRelation::EqualTo, &[uv]),
                Err(e) => err(format!("unable to parse command {line:?}: {e}")),
            }
        }
        DataType::String => err(format!("unable to parse command {line:?}\nif you want to scan for a string, use command `\"`")),
        _ => match parse_uservalue_number(line) {
            Ok(uv) => run_scan(globals, globals.options.scan_data_type, MatchRelation::EqualTo, &[uv]),
            Err(e) => err(format!("not a recognised command or number literal ({line:?}): {e}")),
        },
    }
}

/// `>`/`<`/`=`/`!=`/`+`/`-` all share one handler, mirroring the original's
/// `handler__operators` (née `handler__decinc`): `=`/`!=` ignore any
/// argument (they compare against the previous scan, not a literal) and
/// always mean "unchanged"/"changed"; the other four read an optional
/// argument to decide between the plain and "-by"/relational forms.
fn cmd_relation(globals: &mut Globals, symbol: &str, arg: &str) -> Outcome {
    let has_arg = !arg.is_empty();
    let relation = match symbol {
        ">" if has_arg => MatchRelation::GreaterThan,
        ">" => MatchRelation::Increased,
        "<" if has_arg => MatchRelation::LessThan,
        "<" => MatchRelation::Decreased,
        "=" => MatchRelation::NotChanged,
        "!=" => MatchRelation::Changed,
        "+" if has_arg => MatchRelation::IncreasedBy,
        "+" => MatchRelation::Increased,
        "-" if has_arg => MatchRelation::DecreasedBy,
        "-" => MatchRelation::Decreased,
        _ => unreachable!("dispatch only reaches here for the six relation symbols"),
    };

    if !globals.scanned && !has_arg {
        return err("cannot use that search without matches");
    }

    let user: Vec<UserValue> = if relation.consumes_user_value() {
        match parse_uservalue_number(arg) {
            Ok(uv) => vec![uv],
            Err(e) => return err(e),
        }
    } else {
        Vec::new()
    };
    run_scan(globals, globals.options.scan_data_type, relation, &user)
}

fn scan_string(globals: &mut Globals, text: &str) -> Outcome {
    match parse_uservalue_string(text) {
        Ok(uv) => run_scan(globals, DataType::String, MatchRelation::EqualTo, &[uv]),
        Err(e) => err(e),
    }
}

fn run_scan(globals: &mut Globals, data_type: DataType, relation: MatchRelation, user: &[UserValue]) -> Outcome {
    let result = if globals.scanned {
        driver::checkmatches(globals, data_type, relation, user)
    } else {
        driver::searchregions(globals, data_type, relation, user)
    };
    match result {
        Ok(()) => {
            globals.scanned = true;
            ok(format!("{} matches", globals.store.match_count()))
        }
        Err(e) => err(e),
    }
}

fn cmd_pid(globals: &mut Globals, arg: &str) -> Outcome {
    match arg.parse::<i32>() {
        Ok(pid) => {
            globals.set_pid(pid);
            ok(format!("pid set to {pid}"))
        }
        Err(_) => err(format!("not a valid pid: {arg:?}")),
    }
}

fn cmd_reset(globals: &mut Globals) -> Outcome {
    match globals.reset() {
        Ok(()) => ok(format!("{} regions", globals.regions.len())),
        Err(e) => err(e),
    }
}

fn cmd_snapshot(globals: &mut Globals) -> Outcome {
    run_scan(globals, DataType::AnyNumber, MatchRelation::Any, &[])
}

fn cmd_update(globals: &mut Globals) -> Outcome {
    if !globals.scanned {
        return err("no scan has been run yet");
    }
    match driver::checkmatches(globals, globals.options.scan_data_type, MatchRelation::Update, &[]) {
        Ok(()) => ok(format!("{} matches", globals.store.match_count())),
        Err(e) => err(e),
    }
}

fn cmd_list(globals: &Globals) -> Outcome {
    let mut lines = Vec::new();
    let mut id = 0u64;
    for (swath_idx, swath) in globals.store.swaths().iter().enumerate() {
        for (entry_idx, entry) in swath.entries.iter().enumerate() {
            if !entry.is_match() {
                continue;
            }
            let addr = globals.store.address_of(swath_idx, entry_idx);
            let value = globals.store.data_to_val(swath_idx, entry_idx);
            lines.push(format!("[{id:>4}] 0x{addr:x}: {value}"));
            id += 1;
        }
    }
    if lines.is_empty() {
        ok("no matches")
    } else {
        ok(lines.join("\n"))
    }
}

/// `lregions`: print every region currently enumerated, in the same
/// id/flags/size/start/filename shape `/proc/<pid>/maps` itself uses.
fn cmd_lregions(globals: &Globals) -> Outcome {
    if globals.regions.is_empty() {
        return ok("no regions");
    }
    let lines: Vec<String> = globals
        .regions
        .iter()
        .map(|r| {
            let f = &r.flags;
            let perms = format!(
                "{}{}{}{}",
                if f.read { 'r' } else { '-' },
                if f.write { 'w' } else { '-' },
                if f.exec { 'x' } else { '-' },
                if f.shared { 's' } else if f.private { 'p' } else { '-' },
            );
            format!("[{:>4}] {} {:>10} bytes 0x{:x} {}", r.id, perms, r.size, r.start, r.filename)
        })
        .collect();
    ok(lines.join("\n"))
}

fn cmd_delete(globals: &mut Globals, arg: &str) -> Outcome {
    match arg.parse::<u64>() {
        Ok(id) if globals.store.clear_match(id) => ok(format!("deleted match {id}")),
        Ok(id) => err(format!("no such match: {id}")),
        Err(_) => err(format!("not a valid match id: {arg:?}")),
    }
}

fn cmd_dregion(globals: &mut Globals, arg: &str) -> Outcome {
    let ids = match parse_uintset(arg, globals.regions.len()) {
        Ok(ids) => ids,
        Err(e) => return err(e),
    };
    let dropped: Vec<_> = ids
        .iter()
        .filter_map(|&id| globals.regions.iter().find(|r| r.id == id).cloned())
        .collect();
    for region in &dropped {
        globals.store.delete_in_address_range(region.start, region.end());
    }
    let drop_ids: std::collections::HashSet<usize> = ids.into_iter().collect();
    globals.regions.retain(|r| !drop_ids.contains(&r.id));
    ok(format!("dropped {} region(s)", dropped.len()))
}

/// `set [ids=]v[/delay]`.
fn cmd_set(globals: &mut Globals, arg: &str) -> Outcome {
    if arg.is_empty() {
        return err("usage: set [ids=]v[/delay]");
    }
    if matches!(globals.options.scan_data_type, DataType::ByteArray | DataType::String) {
        return err("`set` is not supported for bytearray/string, use `write` instead");
    }
    if globals.store.match_count() == 0 {
        return err("no matches are known");
    }
    let (body, delay) = match arg.rsplit_once('/') {
        Some((body, delay_str)) => match delay_str.trim().parse::<f64>() {
            Ok(secs) if secs > 0.0 => (body, Some(Duration::from_secs_f64(secs))),
            _ => return err(format!("not a valid delay: {delay_str:?}")),
        },
        None => (arg, None),
    };

    let (ids_str, value_str) = match body.split_once('=') {
        Some((ids, value)) => (ids.trim(), value.trim()),
        None => ("", body.trim()),
    };

    let ids = if ids_str.is_empty() {
        (0..globals.store.match_count()).map(|i| i as usize).collect()
    } else {
        match parse_uintset(ids_str, globals.store.match_count() as usize) {
            Ok(ids) => ids,
            Err(e) => return err(e),
        }
    };

    let value = match parse_uservalue_number(value_str) {
        Ok(uv) => uv,
        Err(e) => return err(e),
    };

    match driver::write_matches(globals, &ids, &value, delay) {
        Ok(()) => ok(format!("wrote {} match(es)", ids.len())),
        Err(e) => err(e),
    }
}

fn cmd_watch(globals: &mut Globals, arg: &str) -> Outcome {
    let id: u64 = match arg.parse() {
        Ok(id) => id,
        Err(_) => return err(format!("not a valid match id: {arg:?}")),
    };
    let Some((swath_idx, entry_idx)) = globals.store.nth_match(id) else {
        return err(format!("no such match: {id}"));
    };
    let addr = globals.store.address_of(swath_idx, entry_idx);
    let Some(pid) = globals.target_pid else {
        return err("no target attached");
    };

    let mut target = match Target::attach(pid) {
        Ok(t) => t,
        Err(e) => return err(e),
    };
    let mut last = target.peek_value(addr);
    let mut lines = vec![format!("{}: {}", timestamp(), last)];

    while !globals.should_stop() {
        let slice = Duration::from_millis(100);
        let mut remaining = Duration::from_secs(1);
        while remaining > Duration::ZERO {
            if globals.should_stop() {
                break;
            }
            let nap = slice.min(remaining);
            std::thread::sleep(nap);
            remaining = remaining.saturating_sub(nap);
        }
        if globals.should_stop() {
            break;
        }
        let current = target.peek_value(addr);
        if current.bytes != last.bytes {
            lines.push(format!("{}: {}", timestamp(), current));
            last = current;
        }
    }
    let _ = target.detach();
    globals.clear_stop();
    ok(lines.join("\n"))
}

fn timestamp() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// `dump addr len [file]`: 16 bytes per line, hex (plus ASCII gutter when
/// `dump_with_ascii` is set), or a raw byte dump to `file` when given.
fn cmd_dump(globals: &mut Globals, arg: &str) -> Outcome {
    let mut tokens = arg.split_whitespace();
    let (Some(addr_str), Some(len_str)) = (tokens.next(), tokens.next()) else {
        return err("usage: dump addr len [file]");
    };
    let file = tokens.next();

    let addr = match parse_addr(addr_str) {
        Ok(a) => a,
        Err(e) => return err(e),
    };
    let len: usize = match len_str.parse() {
        Ok(l) => l,
        Err(_) => return err(format!("not a valid length: {len_str:?}")),
    };
    let Some(pid) = globals.target_pid else {
        return err("no target attached");
    };

    let bytes = match crate::target::with_attached(pid, |t| t.read(addr, len)) {
        Ok(b) => b,
        Err(e) => return err(e),
    };

    if let Some(path) = file {
        match std::fs::write(path, &bytes) {
            Ok(()) => ok(format!("wrote {} bytes to {path}", bytes.len())),
            Err(e) => err(e),
        }
    } else {
        ok(format_hex_dump(addr, &bytes, globals.options.dump_with_ascii))
    }
}

fn format_hex_dump(base: u64, bytes: &[u8], with_ascii: bool) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        out.push_str(&format!("0x{:x}: ", base + (row * 16) as u64));
        for byte in chunk {
            out.push_str(&format!("{byte:02x} "));
        }
        if with_ascii {
            out.push_str(" |");
            for &byte in chunk {
                let c = if byte.is_ascii_graphic() || byte == b' ' { byte as char } else { '.' };
                out.push(c);
            }
            out.push('|');
        }
        out.push('\n');
    }
    out.pop();
    out
}

/// `write type addr v`: a typed write that doesn't consult the match store
/// at all, for poking an arbitrary address.
fn cmd_write(globals: &mut Globals, arg: &str) -> Outcome {
    let mut tokens = arg.split_whitespace();
    let (Some(ty), Some(addr_str)) = (tokens.next(), tokens.next()) else {
        return err("usage: write type addr v");
    };
    let rest: Vec<&str> = tokens.collect();
    if rest.is_empty() {
        return err("usage: write type addr v");
    }
    let addr = match parse_addr(addr_str) {
        Ok(a) => a,
        Err(e) => return err(e),
    };
    let Some(pid) = globals.target_pid else {
        return err("no target attached");
    };

    let bytes = match typed_write_bytes(ty, &rest) {
        Ok(b) => b,
        Err(e) => return err(e),
    };

    match crate::target::with_attached(pid, |t| t.write_bytes(addr, &bytes)) {
        Ok(()) => ok(format!("wrote {} byte(s) at 0x{addr:x}", bytes.len())),
        Err(e) => err(e),
    }
}

fn typed_write_bytes(ty: &str, rest: &[&str]) -> Result<Vec<u8>, String> {
    let v = rest.first().copied().unwrap_or("");
    match ty {
        "i8" => v.parse::<i8>().map(|n| vec![n as u8]).map_err(|e| e.to_string()),
        "i16" => v.parse::<i16>().map(|n| n.to_le_bytes().to_vec()).map_err(|e| e.to_string()),
        "i32" => v.parse::<i32>().map(|n| n.to_le_bytes().to_vec()).map_err(|e| e.to_string()),
        "i64" => v.parse::<i64>().map(|n| n.to_le_bytes().to_vec()).map_err(|e| e.to_string()),
        "f32" => v.parse::<f32>().map(|n| n.to_le_bytes().to_vec()).map_err(|e| e.to_string()),
        "f64" => v.parse::<f64>().map(|n| n.to_le_bytes().to_vec()).map_err(|e| e.to_string()),
        "bytearray" => parse_uservalue_bytearray(rest).map(|uv| uv.bytearray).map_err(|e| e.to_string()),
        "string" => Ok(rest.join(" ").into_bytes()),
        other => Err(format!("unknown write type: {other:?}")),
    }
}

fn parse_addr(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (radix, digits) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, s),
    };
    u64::from_str_radix(digits, radix).map_err(|_| format!("not a valid address: {s:?}"))
}

fn cmd_option(globals: &mut Globals, arg: &str) -> Outcome {
    let mut tokens = arg.split_whitespace();
    let (Some(key), Some(value)) = (tokens.next(), tokens.next()) else {
        return err("usage: option key value");
    };
    match key {
        "scan_data_type" => match parse_data_type(value) {
            Ok(dt) => {
                globals.options.scan_data_type = dt;
                ok(format!("scan_data_type = {value}"))
            }
            Err(e) => err(e),
        },
        "region_scan_level" => match parse_region_scan_level(value) {
            Ok(level) => {
                globals.options.region_scan_level = level;
                ok(format!("region_scan_level = {value}"))
            }
            Err(e) => err(e),
        },
        "detect_reverse_change" => match value.parse::<bool>() {
            Ok(b) => {
                globals.options.detect_reverse_change = b;
                ok(format!("detect_reverse_change = {b}"))
            }
            Err(_) => err(format!("not a bool: {value:?}")),
        },
        "dump_with_ascii" => match value.parse::<bool>() {
            Ok(b) => {
                globals.options.dump_with_ascii = b;
                ok(format!("dump_with_ascii = {b}"))
            }
            Err(_) => err(format!("not a bool: {value:?}")),
        },
        other => err(format!("unknown option: {other:?}")),
    }
}

fn parse_data_type(s: &str) -> Result<DataType, String> {
    Ok(match s {
        "any" | "anynumber" => DataType::AnyNumber,
        "anyinteger" => DataType::AnyInteger,
        "anyfloat" => DataType::AnyFloat,
        "int8" | "i8" => DataType::Int8,
        "int16" | "i16" => DataType::Int16,
        "int32" | "i32" => DataType::Int32,
        "int64" | "i64" => DataType::Int64,
        "float32" | "f32" => DataType::Float32,
        "float64" | "f64" => DataType::Float64,
        "bytearray" => DataType::ByteArray,
        "string" => DataType::String,
        other => return Err(format!("unknown data type: {other:?}")),
    })
}

fn parse_region_scan_level(s: &str) -> Result<crate::region::RegionScanLevel, String> {
    use crate::region::RegionScanLevel;
    Ok(match s {
        "heap_stack_executable" => RegionScanLevel::HeapStackExecutable,
        "heap_stack_executable_bss" => RegionScanLevel::HeapStackExecutableBss,
        "all" => RegionScanLevel::All,
        other => return Err(format!("unknown region scan level: {other:?}")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Region, RegionFlags};

    fn globals_with_region(start: u64, size: u64) -> Globals {
        let mut globals = Globals::new();
        globals.target_pid = Some(1);
        globals.regions.push(Region { id: 0, start, size, flags: RegionFlags::default(), filename: String::new() });
        globals
    }

    #[test]
    fn pid_command_sets_target_and_clears_state() {
        let mut globals = Globals::new();
        globals.store.add_element(1, 1, crate::value::FLAG_U8);
        match execute(&mut globals, "pid 1234") {
            Outcome::Continue(msg) => assert!(msg.contains("1234")),
            Outcome::Quit => panic!("pid should not quit"),
        }
        assert_eq!(globals.target_pid, Some(1234));
        assert!(globals.store.is_empty());
    }

    #[test]
    fn quit_and_exit_leave_the_loop() {
        let mut globals = Globals::new();
        assert!(matches!(execute(&mut globals, "quit"), Outcome::Quit));
        assert!(matches!(execute(&mut globals, "exit"), Outcome::Quit));
    }

    #[test]
    fn help_lists_commands() {
        let mut globals = Globals::new();
        match execute(&mut globals, "help") {
            Outcome::Continue(msg) => {
                assert!(msg.contains("dregion"));
                assert!(msg.contains("watch"));
            }
            Outcome::Quit => panic!("help should not quit"),
        }
    }

    #[test]
    fn delete_rejects_out_of_range_id() {
        let mut globals = Globals::new();
        match execute(&mut globals, "delete 0") {
            Outcome::Continue(msg) => assert!(msg.starts_with("error:")),
            Outcome::Quit => panic!("delete should not quit"),
        }
    }

    #[test]
    fn dregion_drops_matching_region_and_its_matches() {
        let mut globals = globals_with_region(100, 10);
        globals.regions.push(Region { id: 1, start: 200, size: 10, flags: RegionFlags::default(), filename: String::new() });
        globals.store.add_element(105, 1, crate::value::FLAG_U8);
        globals.store.add_element(205, 1, crate::value::FLAG_U8);
        match execute(&mut globals, "dregion 0") {
            Outcome::Continue(msg) => assert!(msg.contains("dropped 1")),
            Outcome::Quit => panic!("dregion should not quit"),
        }
        assert_eq!(globals.regions.len(), 1);
        assert_eq!(globals.regions[0].id, 1);
        assert_eq!(globals.store.match_count(), 1);
    }

    #[test]
    fn option_command_mutates_scan_data_type() {
        let mut globals = Globals::new();
        match execute(&mut globals, "option scan_data_type int32") {
            Outcome::Continue(msg) => assert!(msg.contains("int32")),
            Outcome::Quit => panic!("option should not quit"),
        }
        assert_eq!(globals.options.scan_data_type, DataType::Int32);
    }

    #[test]
    fn lregions_reports_no_regions_on_empty_list() {
        let mut globals = Globals::new();
        match execute(&mut globals, "lregions") {
            Outcome::Continue(msg) => assert_eq!(msg, "no regions"),
            Outcome::Quit => panic!("lregions should not quit"),
        }
    }

    #[test]
    fn lregions_lists_id_flags_size_start_and_filename() {
        let mut globals = globals_with_region(0x1000, 0x2000);
        globals.regions[0].flags.read = true;
        globals.regions[0].flags.write = true;
        globals.regions[0].filename = "[heap]".to_string();
        match execute(&mut globals, "lregions") {
            Outcome::Continue(msg) => {
                assert!(msg.contains("[   0]"), "missing id: {msg}");
                assert!(msg.contains("rw-"), "missing perms: {msg}");
                assert!(msg.contains("0x1000"), "missing start: {msg}");
                assert!(msg.contains("8192"), "missing size: {msg}");
                assert!(msg.contains("[heap]"), "missing filename: {msg}");
            }
            Outcome::Quit => panic!("lregions should not quit"),
        }
    }

    #[test]
    fn list_reports_no_matches_on_empty_store() {
        let mut globals = Globals::new();
        match execute(&mut globals, "list") {
            Outcome::Continue(msg) => assert_eq!(msg, "no matches"),
            Outcome::Quit => panic!("list should not quit"),
        }
    }

    #[test]
    fn unrecognised_non_numeric_input_is_an_error() {
        let mut globals = Globals::new();
        match execute(&mut globals, "bogus_command") {
            Outcome::Continue(msg) => assert!(msg.starts_with("error:")),
            Outcome::Quit => panic!("should not quit"),
        }
    }

    #[test]
    fn bytearray_scan_data_type_parses_bare_hex_pattern() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id() as i32;

        let mut globals = Globals::new();
        execute(&mut globals, &format!("pid {pid}"));
        execute(&mut globals, "option region_scan_level all");
        execute(&mut globals, "option scan_data_type bytearray");
        execute(&mut globals, "reset");

        {
            let mut target = Target::attach(pid).unwrap();
            let region = globals.regions.iter().find(|r| r.size >= 64).cloned().unwrap();
            target.write_bytes(region.start, &[0xde, 0xad, 0xbe, 0xef]).unwrap();
            target.detach().unwrap();
        }

        match execute(&mut globals, "de ad be ef") {
            Outcome::Continue(msg) => assert!(msg.ends_with("matches"), "unexpected response: {msg}"),
            Outcome::Quit => panic!("scan should not quit"),
        }
        assert!(globals.store.match_count() > 0, "expected the written pattern to be found");

        execute(&mut globals, "quit");
        child.kill().ok();
        child.wait().ok();
    }

    #[test]
    fn string_scan_data_type_rejects_bare_input_with_a_hint() {
        let mut globals = Globals::new();
        globals.options.scan_data_type = DataType::String;
        match execute(&mut globals, "hello") {
            Outcome::Continue(msg) => assert!(msg.contains('"'), "expected a hint to use the `\"` command: {msg}"),
            Outcome::Quit => panic!("should not quit"),
        }
    }
}
