//! Connected-component extraction over binary masks.
//!
//! Foreground regions are labeled with 8-connectivity using a two-pass
//! union-find sweep, then filtered by size and optionally ordered largest
//! first. For a chosen blob, the per-row leftmost/rightmost boundary points
//! can be extracted for convex-hull fitting.

use crate::{rect::Rect, resolution::Resolution, threshold::Mask};

/// A maximal 8-connected foreground region of a mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    rect: Rect,
    area: u32,
    label: u32,
}

impl Blob {
    /// The blob's axis-aligned bounding rectangle.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Number of foreground pixels belonging to the blob.
    #[inline]
    pub fn area(&self) -> u32 {
        self.area
    }
}

/// Ordering of the extracted blob list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobOrder {
    /// Whatever order labeling produced.
    #[default]
    Unordered,
    /// Largest pixel area first.
    Size,
}

/// Extracts [`Blob`]s from a [`Mask`].
///
/// Label and union-find scratch buffers are owned by the extractor and
/// reused across frames; they are resized only when the mask resolution
/// changes.
pub struct BlobExtractor {
    min_width: u32,
    min_height: u32,
    coupled_size_filtering: bool,
    order: BlobOrder,
    resolution: Resolution,
    labels: Vec<u32>,
    parents: Vec<u32>,
    blobs: Vec<Blob>,
}

impl BlobExtractor {
    pub fn new() -> Self {
        Self {
            min_width: 1,
            min_height: 1,
            coupled_size_filtering: false,
            order: BlobOrder::default(),
            resolution: Resolution::new(0, 0),
            labels: Vec::new(),
            parents: Vec::new(),
            blobs: Vec::new(),
        }
    }

    /// Sets the minimum blob size in pixels.
    pub fn set_min_size(&mut self, min_width: u32, min_height: u32) {
        self.min_width = min_width;
        self.min_height = min_height;
    }

    /// Selects between coupled and area-based size filtering.
    ///
    /// Coupled filtering keeps a blob only if its bounding width *and*
    /// height independently clear the minimums. Uncoupled filtering keeps a
    /// blob if its pixel area reaches `min_width * min_height`, regardless
    /// of shape.
    pub fn set_coupled_size_filtering(&mut self, coupled: bool) {
        self.coupled_size_filtering = coupled;
    }

    pub fn set_order(&mut self, order: BlobOrder) {
        self.order = order;
    }

    /// Labels `mask` and rebuilds the blob list.
    ///
    /// A mask with no foreground pixels yields an empty list; that is not an
    /// error.
    pub fn process(&mut self, mask: &Mask) {
        self.resolution = mask.resolution();
        let (width, height) = (
            self.resolution.width() as usize,
            self.resolution.height() as usize,
        );

        self.labels.clear();
        self.labels.resize(width * height, 0);
        self.parents.clear();
        self.parents.push(0); // label 0 is the background
        self.blobs.clear();

        let raw = mask.as_raw();

        // First pass: provisional labels, recording equivalences between
        // touching runs in the union-find forest.
        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                if raw[idx] == 0 {
                    continue;
                }

                // Already-visited 8-neighbors: W, NW, N, NE.
                let mut neighbor = 0;
                let mut merge = [0u32; 4];
                let mut merges = 0;
                if x > 0 && self.labels[idx - 1] != 0 {
                    merge[merges] = self.labels[idx - 1];
                    merges += 1;
                }
                if y > 0 {
                    let above = idx - width;
                    if x > 0 && self.labels[above - 1] != 0 {
                        merge[merges] = self.labels[above - 1];
                        merges += 1;
                    }
                    if self.labels[above] != 0 {
                        merge[merges] = self.labels[above];
                        merges += 1;
                    }
                    if x + 1 < width && self.labels[above + 1] != 0 {
                        merge[merges] = self.labels[above + 1];
                        merges += 1;
                    }
                }

                for &l in &merge[..merges] {
                    let root = find(&mut self.parents, l);
                    if neighbor == 0 || root < neighbor {
                        if neighbor != 0 {
                            self.parents[neighbor as usize] = root;
                        }
                        neighbor = root;
                    } else if root != neighbor {
                        self.parents[root as usize] = neighbor;
                    }
                }

                if neighbor == 0 {
                    let label = self.parents.len() as u32;
                    self.parents.push(label);
                    self.labels[idx] = label;
                } else {
                    self.labels[idx] = neighbor;
                }
            }
        }

        // Second pass: resolve every pixel to its root, assign compact final
        // labels, and accumulate bounding boxes and areas.
        let mut root_to_final = vec![0u32; self.parents.len()];
        struct Stats {
            x_min: u32,
            x_max: u32,
            y_min: u32,
            y_max: u32,
            area: u32,
        }
        let mut stats: Vec<Stats> = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                if self.labels[idx] == 0 {
                    continue;
                }

                let root = find(&mut self.parents, self.labels[idx]);
                let final_label = if root_to_final[root as usize] == 0 {
                    stats.push(Stats {
                        x_min: x as u32,
                        x_max: x as u32,
                        y_min: y as u32,
                        y_max: y as u32,
                        area: 0,
                    });
                    root_to_final[root as usize] = stats.len() as u32;
                    stats.len() as u32
                } else {
                    root_to_final[root as usize]
                };
                self.labels[idx] = final_label;

                let s = &mut stats[(final_label - 1) as usize];
                s.x_min = s.x_min.min(x as u32);
                s.x_max = s.x_max.max(x as u32);
                s.y_min = s.y_min.min(y as u32);
                s.y_max = s.y_max.max(y as u32);
                s.area += 1;
            }
        }

        self.blobs.extend(stats.iter().enumerate().map(|(i, s)| Blob {
            rect: Rect::from_corners(
                (s.x_min as i32, s.y_min as i32),
                (s.x_max as i32, s.y_max as i32),
            ),
            area: s.area,
            label: i as u32 + 1,
        }));

        let (min_w, min_h) = (self.min_width, self.min_height);
        if self.coupled_size_filtering {
            self.blobs
                .retain(|b| b.rect.width() >= min_w && b.rect.height() >= min_h);
        } else {
            let min_area = u64::from(min_w) * u64::from(min_h);
            self.blobs.retain(|b| u64::from(b.area) >= min_area);
        }

        if self.order == BlobOrder::Size {
            self.blobs.sort_by(|a, b| b.area.cmp(&a.area));
        }
    }

    /// The blobs found by the last [`process`][Self::process].
    #[inline]
    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    /// Collects `blob`'s ordered boundary points into `left` and `right`.
    ///
    /// For every row spanned by the blob's bounding rectangle, top to
    /// bottom, the leftmost and rightmost pixel belonging to *this* blob is
    /// recorded. The output vectors are cleared first so callers can reuse
    /// them as scratch.
    pub fn collect_edges(
        &self,
        blob: &Blob,
        left: &mut Vec<(i32, i32)>,
        right: &mut Vec<(i32, i32)>,
    ) {
        left.clear();
        right.clear();

        let width = self.resolution.width() as usize;
        let rect = blob.rect;
        for y in rect.y()..rect.bottom() {
            let row = &self.labels[y as usize * width..][..width];

            let first = (rect.x()..rect.right()).find(|&x| row[x as usize] == blob.label);
            let last = (rect.x()..rect.right())
                .rev()
                .find(|&x| row[x as usize] == blob.label);
            if let (Some(first), Some(last)) = (first, last) {
                left.push((first, y));
                right.push((last, y));
            }
        }
    }
}

impl Default for BlobExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn find(parents: &mut [u32], mut label: u32) -> u32 {
    while parents[label as usize] != label {
        // Path halving keeps the forest shallow without a second sweep.
        parents[label as usize] = parents[parents[label as usize] as usize];
        label = parents[label as usize];
    }
    label
}
