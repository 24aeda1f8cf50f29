use std::path::{Path, PathBuf};
use std::{error::Error, fmt, fs, io};

use mlp_core::ParamLayout;
use safetensors::tensor::{TensorView, serialize};
use safetensors::{Dtype, SafeTensorError, SafeTensors};

/// Checkpoint read/write failures. Messages name the offending path or
/// tensor so the operator can tell a bad file from a bad destination.
#[derive(Debug)]
pub enum CheckpointErr {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: SafeTensorError },
    Serialize(SafeTensorError),
    MissingTensor { name: &'static str },
    WrongDtype { name: &'static str, got: Dtype },
    WrongShape { name: &'static str, got: Vec<usize>, expected: Vec<usize> },
    BufferLen { got: usize, expected: usize },
}

impl fmt::Display for CheckpointErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointErr::Io { path, source } => {
                write!(f, "io error on {}: {source}", path.display())
            }
            CheckpointErr::Parse { path, source } => {
                write!(f, "malformed safetensors file {}: {source}", path.display())
            }
            CheckpointErr::Serialize(source) => write!(f, "serialize error: {source}"),
            CheckpointErr::MissingTensor { name } => {
                write!(f, "tensor {name} not found in checkpoint")
            }
            CheckpointErr::WrongDtype { name, got } => {
                write!(f, "tensor {name} has dtype {got:?}, expected F32")
            }
            CheckpointErr::WrongShape { name, got, expected } => {
                write!(f, "tensor {name} has shape {got:?}, expected {expected:?}")
            }
            CheckpointErr::BufferLen { got, expected } => {
                write!(f, "parameter buffer holds {got} values, layout expects {expected}")
            }
        }
    }
}

impl Error for CheckpointErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CheckpointErr::Io { source, .. } => Some(source),
            CheckpointErr::Parse { source, .. } => Some(source),
            CheckpointErr::Serialize(source) => Some(source),
            _ => None,
        }
    }
}

/// Serializes the flat parameter buffer to `path` as one F32 safetensors
/// tensor per layout entry.
///
/// The bytes go to a sibling temp file first and are renamed into place,
/// so a failed save never leaves a truncated checkpoint at `path`.
///
/// # Errors
/// Returns `CheckpointErr::BufferLen` if `params` does not match the
/// layout, and `Serialize`/`Io` for encoding and filesystem failures.
pub fn save(path: &Path, layout: &ParamLayout, params: &[f32]) -> Result<(), CheckpointErr> {
    if params.len() != layout.len() {
        return Err(CheckpointErr::BufferLen { got: params.len(), expected: layout.len() });
    }

    let mut views = Vec::with_capacity(layout.tensors().len());
    for spec in layout.tensors() {
        let bytes: &[u8] = bytemuck::cast_slice(&params[spec.range.clone()]);
        let view = TensorView::new(Dtype::F32, spec.shape.clone(), bytes)
            .map_err(CheckpointErr::Serialize)?;
        views.push((spec.name, view));
    }

    let bytes = serialize(views, &None).map_err(CheckpointErr::Serialize)?;

    let tmp = tmp_path(path);
    fs::write(&tmp, &bytes).map_err(|source| CheckpointErr::Io { path: tmp.clone(), source })?;
    fs::rename(&tmp, path)
        .map_err(|source| CheckpointErr::Io { path: path.to_path_buf(), source })?;

    Ok(())
}

/// Reads a checkpoint back into a flat parameter buffer in layout order.
///
/// Each layout tensor is validated by name, dtype and shape; tensors in
/// the file that the layout does not name are ignored.
///
/// # Errors
/// Returns `CheckpointErr::Io`/`Parse` for unreadable or malformed files
/// and `MissingTensor`/`WrongDtype`/`WrongShape` for architecture
/// mismatches.
pub fn load(path: &Path, layout: &ParamLayout) -> Result<Vec<f32>, CheckpointErr> {
    let bytes =
        fs::read(path).map_err(|source| CheckpointErr::Io { path: path.to_path_buf(), source })?;
    let tensors = SafeTensors::deserialize(&bytes)
        .map_err(|source| CheckpointErr::Parse { path: path.to_path_buf(), source })?;

    let mut params = vec![0.0f32; layout.len()];
    for spec in layout.tensors() {
        let view = tensors
            .tensor(spec.name)
            .map_err(|_| CheckpointErr::MissingTensor { name: spec.name })?;
        if view.dtype() != Dtype::F32 {
            return Err(CheckpointErr::WrongDtype { name: spec.name, got: view.dtype() });
        }
        if view.shape() != spec.shape.as_slice() {
            return Err(CheckpointErr::WrongShape {
                name: spec.name,
                got: view.shape().to_vec(),
                expected: spec.shape.clone(),
            });
        }

        let out = &mut params[spec.range.clone()];
        for (dst, chunk) in out.iter_mut().zip(view.data().chunks_exact(4)) {
            *dst = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
    }

    Ok(params)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
