//! ESRI ASCII grid parsing.
//!
//! ```text
//! ncols         4
//! nrows         2
//! xllcorner     100.0
//! yllcorner     200.0
//! cellsize      10.0
//! NODATA_value  -9999
//! 1 2 3 4
//! 5 6 -9999 8
//! ```
//!
//! Cells are listed row by row starting from the northernmost row.

use geosource_core_common::{Envelope, RasterTile};
use geosource_shared::{SourcePosition, SpatialFormatReadError, SpatialFormatResult};

/// Grid metadata read from the header lines.
#[derive(Debug, Clone, PartialEq)]
pub struct GridHeader {
    pub ncols: usize,
    pub nrows: usize,
    /// Lower-left corner of the lower-left cell.
    pub xllcorner: f64,
    pub yllcorner: f64,
    pub cellsize: f64,
    pub nodata: Option<f64>,
}

impl GridHeader {
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        Envelope::new(
            self.xllcorner,
            self.yllcorner,
            self.xllcorner + self.cellsize * self.ncols as f64,
            self.yllcorner + self.cellsize * self.nrows as f64,
        )
    }
}

/// A fully loaded grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    pub header: GridHeader,
    /// Row-major cells, top row first.
    pub data: Vec<f64>,
}

impl AsciiGrid {
    /// Parses the text of an `.asc` file.
    ///
    /// # Errors
    ///
    /// Returns a parse error when a header key is missing or malformed, or
    /// when the number of cells does not match `ncols * nrows`.
    pub fn parse(text: &str, context: &str) -> SpatialFormatResult<Self> {
        let mut ncols = None;
        let mut nrows = None;
        let mut xll = None;
        let mut yll = None;
        let mut cellsize = None;
        let mut nodata = None;
        let mut data = Vec::new();
        let mut in_header = true;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx as u64 + 1;
            let mut tokens = line.split_whitespace().peekable();
            let Some(first) = tokens.peek().copied() else {
                continue;
            };

            if in_header && first.parse::<f64>().is_err() {
                let key = first.to_ascii_lowercase();
                tokens.next();
                let value = tokens.next().ok_or_else(|| {
                    SpatialFormatReadError::parse(format!("Header '{key}' has no value"), context)
                        .at(SourcePosition::line(line_no))
                })?;
                let number = parse_number(value, context, line_no)?;
                match key.as_str() {
                    "ncols" => ncols = Some(parse_dimension(number, &key, context, line_no)?),
                    "nrows" => nrows = Some(parse_dimension(number, &key, context, line_no)?),
                    "xllcorner" => xll = Some((number, false)),
                    "xllcenter" => xll = Some((number, true)),
                    "yllcorner" => yll = Some((number, false)),
                    "yllcenter" => yll = Some((number, true)),
                    "cellsize" => cellsize = Some(number),
                    "nodata_value" => nodata = Some(number),
                    _ => log::debug!("Ignoring unknown ASCII grid header '{key}'"),
                }
                continue;
            }

            in_header = false;
            for token in tokens {
                data.push(parse_number(token, context, line_no)?);
            }
        }

        let missing =
            |key: &str| SpatialFormatReadError::parse(format!("Missing '{key}' header"), context);
        let ncols = ncols.ok_or_else(|| missing("ncols"))?;
        let nrows = nrows.ok_or_else(|| missing("nrows"))?;
        let cellsize = cellsize.ok_or_else(|| missing("cellsize"))?;
        if cellsize <= 0.0 {
            return Err(SpatialFormatReadError::parse(
                format!("cellsize must be positive, found {cellsize}"),
                context,
            ));
        }
        let (x, x_centered) = xll.ok_or_else(|| missing("xllcorner"))?;
        let (y, y_centered) = yll.ok_or_else(|| missing("yllcorner"))?;
        let half = cellsize / 2.0;

        let expected = ncols.checked_mul(nrows).ok_or_else(|| {
            SpatialFormatReadError::parse(
                format!("A {ncols}x{nrows} grid has too many cells"),
                context,
            )
        })?;
        if data.len() != expected {
            return Err(SpatialFormatReadError::parse(
                format!(
                    "Expected {expected} cell value(s) for a {ncols}x{nrows} grid, found {}",
                    data.len()
                ),
                context,
            ));
        }

        Ok(Self {
            header: GridHeader {
                ncols,
                nrows,
                xllcorner: if x_centered { x - half } else { x },
                yllcorner: if y_centered { y - half } else { y },
                cellsize,
                nodata,
            },
            data,
        })
    }

    /// Cells overlapping `bbox`, or `None` if the box misses the grid.
    ///
    /// `envelope` is where the grid is placed, normally
    /// [`GridHeader::envelope`] unless the caller overrides it.
    #[must_use]
    pub fn window(&self, envelope: &Envelope, bbox: &Envelope) -> Option<RasterTile> {
        if !envelope.intersects(bbox) {
            return None;
        }
        let GridHeader {
            ncols,
            nrows,
            nodata,
            ..
        } = self.header;
        let cell_w = envelope.width() / ncols as f64;
        let cell_h = envelope.height() / nrows as f64;

        let (col0, col1) = cell_range(
            bbox.minx - envelope.minx,
            bbox.maxx - envelope.minx,
            cell_w,
            ncols,
        );
        let (row0, row1) = cell_range(
            envelope.maxy - bbox.maxy,
            envelope.maxy - bbox.miny,
            cell_h,
            nrows,
        );

        let mut data = Vec::with_capacity((col1 - col0) * (row1 - row0));
        for row in row0..row1 {
            let start = row * ncols;
            data.extend_from_slice(&self.data[start + col0..start + col1]);
        }

        Some(RasterTile {
            width: col1 - col0,
            height: row1 - row0,
            envelope: Envelope::new(
                envelope.minx + col0 as f64 * cell_w,
                envelope.maxy - row1 as f64 * cell_h,
                envelope.minx + col1 as f64 * cell_w,
                envelope.maxy - row0 as f64 * cell_h,
            ),
            nodata,
            data,
        })
    }
}

/// Half-open index range of cells covering `[lo, hi]` offsets; never empty.
fn cell_range(lo: f64, hi: f64, cell: f64, count: usize) -> (usize, usize) {
    let clamp = |v: f64| v.max(0.0).min(count as f64) as usize;
    let start = clamp((lo / cell).floor()).min(count - 1);
    let end = clamp((hi / cell).ceil()).max(start + 1);
    (start, end)
}

fn parse_number(token: &str, context: &str, line: u64) -> SpatialFormatResult<f64> {
    token.parse::<f64>().map_err(|_| {
        SpatialFormatReadError::parse(format!("Invalid number '{token}'"), context)
            .at(SourcePosition::line(line))
    })
}

fn parse_dimension(value: f64, key: &str, context: &str, line: u64) -> SpatialFormatResult<usize> {
    // Above this the cast to usize saturates.
    let max = usize::MAX as f64;
    if value >= 1.0 && value < max && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(
            SpatialFormatReadError::parse(format!("'{key}' must be a positive integer"), context)
                .at(SourcePosition::line(line)),
        )
    }
}
