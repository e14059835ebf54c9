#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # datatools

 Small command line tools for delimited data, document paths and CodeMeta
 metadata, built on a reusable record transcoder.

 ## Core Concepts

- **Record:** one logical row of delimited fields, in input order.
- **Decoder:** a lazy, forward-only sequence of records read from a byte
  stream with configurable quoting, comment and field-count rules.
- **Encoding:** a target delimiter and quoting rule. Encoding a record never
  fails.
- **ItemReader / ItemWriter:** the two ends of a `Step`.
- **Step:** drives a reader into a writer one record at a time, skipping
  and reporting records that fail to decode.

 ## Binaries

| **Binary**     | **Description**                                              |
|----------------|--------------------------------------------------------------|
| csv2tab        | Converts CSV on stdin to tab separated values on stdout      |
| tab2csv        | Converts tab separated values on stdin to CSV on stdout      |
| reldocpath     | Prints the path of a target document relative to a source    |
| codemeta2cff   | Writes `CITATION.cff` from `codemeta.json`                   |

 ## Features

| **Feature** | **Description**                                 |
|-------------|-------------------------------------------------|
| codemeta    | CodeMeta to CITATION.cff conversion (default)   |

 ## Getting Started

```rust
use datatools::{
    config::TranscoderConfig,
    core::step::{StepBuilder, StepStatus},
    item::delimited::{DelimitedItemReaderBuilder, DelimitedItemWriterBuilder, Encoding},
};

let csv = "name,email,age\n\"Doe, Jane\",\"jane.doe@example.org\",42\n";

let reader = DelimitedItemReaderBuilder::new()
    .config(TranscoderConfig::csv())
    .from_reader(csv.as_bytes())
    .unwrap();

let writer = DelimitedItemWriterBuilder::new()
    .encoding(Encoding::tsv())
    .from_writer(Vec::new())
    .unwrap();

let execution = StepBuilder::new("csv2tab")
    .reader(&reader)
    .writer(&writer)
    .build()
    .execute();

assert_eq!(execution.status, StepStatus::Success);
assert_eq!(
    String::from_utf8(writer.into_inner().unwrap()).unwrap(),
    "name\temail\tage\nDoe, Jane\tjane.doe@example.org\t42\n"
);
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module for reading, writing and stepping through items
pub mod core;

/// Error types for transcoding
pub mod error;

#[doc(inline)]
pub use error::*;

/// Decoder configuration
pub mod config;

/// Set of items readers / writers
pub mod item;

/// Document path arithmetic
pub mod path;

/// Command line plumbing shared by the binaries
pub mod cli;

#[cfg(feature = "codemeta")]
#[cfg_attr(docsrs, doc(cfg(feature = "codemeta")))]
/// CodeMeta to CITATION.cff conversion
pub mod codemeta;
