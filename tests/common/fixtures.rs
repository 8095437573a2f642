//! Static log corpora used across harnesses.
//!
//! Lines are shaped like real controller output: an INI-like header, then
//! `key=payload` rows, with the occasional truncated or garbled entry.

/// The worked example payload: name, dimensions, then the time/date block.
pub const SAMPLE_PAYLOAD: &str = "ABC123.301,1200,600,18,0,10,0,5,2025,15,8,20,12,0,25,0,50";

/// A log with every prefix variant and no bad lines.
pub const CORPUS_CLEAN: &[&str] = &[
    "[Optimizations]",
    r"1=.\prg\W954ST1418.301,2440,1830,18,5,7,0,0,2025,15,8,9,7,0,30,0,3",
    r"2=C:\WinCut\prg\W954ST1418.302,2440,1830,18,12,7,0,10,2025,15,8,20,7,0,0,0,2",
    r"3=.\MDF_BLANCO.7,2750,1830,15,0,8,0,45,2025,15,8,30,8,0,15,1,10",
    r"4=C:WinCut\prg\PUERTA.2.100,2440,1220,9,59,23,0,59,2025,31,12,0,0,0,1,0,1",
    "5=PLAIN,1000,500,3,0,0,0,0,2024,29,2,0,1,0,0,0,7",
];

/// Program names [`CORPUS_CLEAN`] decodes to, in order.
pub const CORPUS_CLEAN_NAMES: &[&str] = &[
    "W954ST1418.301",
    "W954ST1418.302",
    "MDF_BLANCO.7",
    "PUERTA.2.100",
    "PLAIN",
];

/// Lines that must never produce a record.
pub const CORPUS_BAD: &[&str] = &[
    "",
    "   ",
    "[Header]",
    "; comment without separator",
    "PRG=ONLY,10,fields,here,1,2,3,4,5,6",
    "PRG=",
    "PRG=X.1,abc,600,18,0,10,0,5,2025,15,8,20,12,0,25,0,50",
    "PRG=X.1,1200,600,18,0,10,0,5,2025,15,13,20,12,0,25,0,50",
    "PRG=X.1,1200,600,18,0,25,0,5,2025,15,8,20,12,0,25,0,50",
    "PRG=X.1,1200,600,18,0,10,0,5,2025,15,8,20,12,0,25,0,",
];
