//! The `solution.h5` example file.
//!
//! One group holding one 3×3 `f32` dataset, with a string attribute on the
//! group and a float attribute on the dataset:
//!
//! ```text
//! /important_data                 @content = "Contains a dataset with ..."
//! /important_data/my_cool_data    f32 [3, 3] (max [3, 3])  @mean = 42.05
//! ```

use std::path::Path;

use lablog_h5::{AttrValue, Dataset, Datatype, FileWriter, Group, H5Error, H5File};
use thiserror::Error;

/// Default output file name.
pub const FILE_NAME: &str = "solution.h5";
/// Name of the group under the root.
pub const GROUP_NAME: &str = "important_data";
/// Name of the dataset inside the group.
pub const DATASET_NAME: &str = "my_cool_data";
/// Group attribute name.
pub const CONTENT_ATTR: &str = "content";
/// Group attribute value.
pub const CONTENT: &str = "Contains a dataset with the answer to everything!";
/// Dataset attribute name.
pub const MEAN_ATTR: &str = "mean";
/// Dataset attribute value.
pub const MEAN: f32 = 42.05;
/// Dataset shape, also recorded as its maximum shape.
pub const SHAPE: [u64; 2] = [3, 3];
/// Dataset values, row-major.
pub const VALUES: [f32; 9] = [42.0, 42.0, 42.0, 42.0, 42.0, 42.0, 42.0, 42.0, 42.42];

/// The first way a file differs from the expected solution.
#[derive(Debug, Error)]
pub enum SolutionError {
    /// The file could not be read.
    #[error(transparent)]
    H5(#[from] H5Error),
    /// A group is missing or is not a group.
    #[error("missing group {0:?}")]
    MissingGroup(String),
    /// A dataset is missing or is not a dataset.
    #[error("missing dataset {0:?}")]
    MissingDataset(String),
    /// The dataset's element type is wrong.
    #[error("dataset has type {found}, expected f32")]
    WrongDatatype {
        /// Stored type.
        found: Datatype,
    },
    /// The dataset's current or maximum shape is wrong.
    #[error("{which} shape is {found:?}, expected {expected:?}")]
    WrongShape {
        /// `"current"` or `"maximum"`.
        which: &'static str,
        /// Expected dimensions.
        expected: Vec<u64>,
        /// Stored dimensions, empty when absent.
        found: Vec<u64>,
    },
    /// A dataset element differs.
    #[error("element {index} is {found}, expected {expected}")]
    WrongValue {
        /// Row-major element index.
        index: usize,
        /// Expected value.
        expected: f32,
        /// Stored value.
        found: f32,
    },
    /// An attribute is missing.
    #[error("{object} has no attribute {name:?}")]
    MissingAttribute {
        /// Path of the owning object.
        object: &'static str,
        /// Attribute name.
        name: &'static str,
    },
    /// An attribute has the wrong type or value.
    #[error("attribute {name:?} is {found:?}, expected {expected:?}")]
    WrongAttribute {
        /// Attribute name.
        name: &'static str,
        /// Expected value.
        expected: AttrValue,
        /// Stored value.
        found: AttrValue,
    },
}

/// Build the example tree.
pub fn solution_tree() -> Result<Group, H5Error> {
    let mut root = Group::new();
    let group = root.create_group(GROUP_NAME)?;
    group.set_attr(CONTENT_ATTR, CONTENT)?;
    let data = Dataset::from_f32(&SHAPE, &VALUES)?.with_max_shape(&SHAPE)?;
    group
        .insert_dataset(DATASET_NAME, data)?
        .set_attr(MEAN_ATTR, MEAN)?;
    Ok(root)
}

/// Write the example file to `path`, replacing any existing file.
pub fn write_solution(path: impl AsRef<Path>) -> Result<(), H5Error> {
    let path = path.as_ref();
    FileWriter::new(&solution_tree()?).write_to(path)?;
    log::info!("solution written to {}", path.display());
    Ok(())
}

fn check_attr(
    owner: Option<&AttrValue>,
    object: &'static str,
    name: &'static str,
    expected: AttrValue,
) -> Result<(), SolutionError> {
    let found = owner.ok_or(SolutionError::MissingAttribute { object, name })?;
    if *found != expected {
        return Err(SolutionError::WrongAttribute {
            name,
            expected,
            found: found.clone(),
        });
    }
    Ok(())
}

/// Verify that `file` holds exactly the example content.
///
/// Values are compared bit for bit. Extra members or attributes are
/// allowed.
pub fn check_solution(file: &H5File) -> Result<(), SolutionError> {
    let group = file
        .group(GROUP_NAME)
        .ok_or_else(|| SolutionError::MissingGroup(GROUP_NAME.into()))?;
    check_attr(
        group.attr(CONTENT_ATTR),
        "/important_data",
        CONTENT_ATTR,
        AttrValue::from(CONTENT),
    )?;

    let dataset = group
        .dataset(DATASET_NAME)
        .ok_or_else(|| SolutionError::MissingDataset(format!("{GROUP_NAME}/{DATASET_NAME}")))?;
    if dataset.datatype() != Datatype::F32 {
        return Err(SolutionError::WrongDatatype {
            found: dataset.datatype(),
        });
    }
    if dataset.shape() != SHAPE {
        return Err(SolutionError::WrongShape {
            which: "current",
            expected: SHAPE.to_vec(),
            found: dataset.shape().to_vec(),
        });
    }
    if dataset.max_shape() != Some(&SHAPE[..]) {
        return Err(SolutionError::WrongShape {
            which: "maximum",
            expected: SHAPE.to_vec(),
            found: dataset.max_shape().map(<[u64]>::to_vec).unwrap_or_default(),
        });
    }
    let values = dataset.read_f32()?;
    if let Some((index, (&found, &expected))) = values
        .iter()
        .zip(VALUES.iter())
        .enumerate()
        .find(|(_, (a, b))| a.to_bits() != b.to_bits())
    {
        return Err(SolutionError::WrongValue {
            index,
            expected,
            found,
        });
    }
    check_attr(
        dataset.attr(MEAN_ATTR),
        "/important_data/my_cool_data",
        MEAN_ATTR,
        AttrValue::F32(MEAN),
    )?;
    Ok(())
}
