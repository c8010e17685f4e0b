//! Vetting of model-declared dependency lists.
//!
//! The synthesis prompt forbids declaring standard-library modules as
//! external dependencies, but prompt text is not enforcement: the declared
//! list is checked programmatically before a manifest is rendered. Names in
//! the standard-library set, and strings that are not shaped like a legal
//! requirement, are dropped. Kept entries preserve model order and
//! duplicates.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::{Dependency, GeneratedArtifact};

/// Top-level standard-library modules of CPython 3.11/3.12
/// (`sys.stdlib_module_names`, public names).
const STDLIB_MODULES: &[&str] = &[
    "abc",
    "aifc",
    "argparse",
    "array",
    "ast",
    "asyncio",
    "atexit",
    "audioop",
    "base64",
    "bdb",
    "binascii",
    "bisect",
    "builtins",
    "bz2",
    "calendar",
    "cgi",
    "cgitb",
    "chunk",
    "cmath",
    "cmd",
    "code",
    "codecs",
    "codeop",
    "collections",
    "colorsys",
    "compileall",
    "concurrent",
    "configparser",
    "contextlib",
    "contextvars",
    "copy",
    "copyreg",
    "cProfile",
    "crypt",
    "csv",
    "ctypes",
    "curses",
    "dataclasses",
    "datetime",
    "dbm",
    "decimal",
    "difflib",
    "dis",
    "doctest",
    "email",
    "encodings",
    "ensurepip",
    "enum",
    "errno",
    "faulthandler",
    "fcntl",
    "filecmp",
    "fileinput",
    "fnmatch",
    "fractions",
    "ftplib",
    "functools",
    "gc",
    "getopt",
    "getpass",
    "gettext",
    "glob",
    "graphlib",
    "grp",
    "gzip",
    "hashlib",
    "heapq",
    "hmac",
    "html",
    "http",
    "idlelib",
    "imaplib",
    "imghdr",
    "importlib",
    "inspect",
    "io",
    "ipaddress",
    "itertools",
    "json",
    "keyword",
    "linecache",
    "locale",
    "logging",
    "lzma",
    "mailbox",
    "mailcap",
    "marshal",
    "math",
    "mimetypes",
    "mmap",
    "modulefinder",
    "msilib",
    "msvcrt",
    "multiprocessing",
    "netrc",
    "nis",
    "nntplib",
    "ntpath",
    "nturl2path",
    "numbers",
    "operator",
    "optparse",
    "os",
    "ossaudiodev",
    "pathlib",
    "pdb",
    "pickle",
    "pickletools",
    "pipes",
    "pkgutil",
    "platform",
    "plistlib",
    "poplib",
    "posix",
    "posixpath",
    "pprint",
    "profile",
    "pstats",
    "pty",
    "pwd",
    "py_compile",
    "pyclbr",
    "pydoc",
    "queue",
    "quopri",
    "random",
    "re",
    "readline",
    "reprlib",
    "resource",
    "rlcompleter",
    "runpy",
    "sched",
    "secrets",
    "select",
    "selectors",
    "shelve",
    "shlex",
    "shutil",
    "signal",
    "site",
    "smtplib",
    "sndhdr",
    "socket",
    "socketserver",
    "spwd",
    "sqlite3",
    "ssl",
    "stat",
    "statistics",
    "string",
    "stringprep",
    "struct",
    "subprocess",
    "sunau",
    "symtable",
    "sys",
    "sysconfig",
    "syslog",
    "tabnanny",
    "tarfile",
    "telnetlib",
    "tempfile",
    "termios",
    "textwrap",
    "threading",
    "time",
    "timeit",
    "tkinter",
    "token",
    "tokenize",
    "tomllib",
    "trace",
    "traceback",
    "tracemalloc",
    "tty",
    "turtle",
    "turtledemo",
    "types",
    "typing",
    "unicodedata",
    "unittest",
    "urllib",
    "uu",
    "uuid",
    "venv",
    "warnings",
    "wave",
    "weakref",
    "webbrowser",
    "winreg",
    "winsound",
    "wsgiref",
    "xdrlib",
    "xml",
    "xmlrpc",
    "zipapp",
    "zipfile",
    "zipimport",
    "zlib",
    "zoneinfo",
];

static STDLIB_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STDLIB_MODULES.iter().copied().collect());

/// Requirement shape accepted in a manifest: a distribution name, optional
/// extras, optional version specifiers. Rejects anything that could break
/// out of a quoted manifest entry (quotes, newlines, comment markers).
static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?(?:\[[A-Za-z0-9._,\- ]+\])?(?:\s*[<>=!~]=?\s*[A-Za-z0-9.*+!,<>=~\- ]+)?$",
    )
    .expect("requirement pattern should be valid")
});

/// Whether `name` is a top-level Python standard-library module.
pub fn is_stdlib_module(name: &str) -> bool {
    STDLIB_SET.contains(name)
}

/// Whether `requirement` is shaped like a legal dependency declaration.
pub fn is_valid_requirement(requirement: &str) -> bool {
    REQUIREMENT_RE.is_match(requirement)
}

/// Distribution name portion of a requirement (before extras or specifiers).
fn base_name(requirement: &str) -> &str {
    let end = requirement
        .find(|ch: char| matches!(ch, '[' | '<' | '>' | '=' | '!' | '~' | ' '))
        .unwrap_or(requirement.len());
    &requirement[..end]
}

/// Drop standard-library and ill-shaped entries from the declared list.
///
/// Returns the names that were dropped; the artifact's remaining entries keep
/// their original order and duplicates.
pub fn vet_dependencies(artifact: &mut GeneratedArtifact) -> Vec<String> {
    let mut dropped = Vec::new();
    let kept: Vec<Dependency> = artifact
        .dependencies
        .drain(..)
        .filter(|dep| {
            let name = dep.module.trim();
            if !is_valid_requirement(name) || is_stdlib_module(base_name(name)) {
                dropped.push(dep.module.clone());
                false
            } else {
                true
            }
        })
        .collect();
    artifact.dependencies = kept;
    dropped
}
