//! In-memory compound file images for tests.

use super::consts::*;

/// OLE2 header builder
pub(crate) struct HeaderBuilder {
    /// Sector size (512 or 4096)
    sector_size: usize,
    first_dir_sector: u32,
    /// Number of directory sectors (csectDir). For 512-byte sector files, must be 0.
    num_dir_sectors: u32,
    first_minifat_sector: u32,
    num_minifat_sectors: u32,
    first_difat_sector: u32,
    num_difat_sectors: u32,
    /// Total FAT sector count; defaults to the header list length
    num_fat_sectors: Option<u32>,
    /// FAT sector IDs (first 109 in header)
    fat_sectors: Vec<u32>,
}

impl HeaderBuilder {
    pub(crate) fn new(sector_size: usize) -> Self {
        Self {
            sector_size,
            first_dir_sector: 0,
            num_dir_sectors: 0,
            first_minifat_sector: ENDOFCHAIN,
            num_minifat_sectors: 0,
            first_difat_sector: ENDOFCHAIN,
            num_difat_sectors: 0,
            num_fat_sectors: None,
            fat_sectors: Vec::new(),
        }
    }

    pub(crate) fn set_first_dir_sector(&mut self, sector: u32) {
        self.first_dir_sector = sector;
    }

    pub(crate) fn set_num_dir_sectors(&mut self, num: u32) {
        self.num_dir_sectors = if self.sector_size == 512 { 0 } else { num };
    }

    pub(crate) fn set_minifat(&mut self, first_sector: u32, num_sectors: u32) {
        self.first_minifat_sector = first_sector;
        self.num_minifat_sectors = num_sectors;
    }

    pub(crate) fn set_difat(&mut self, first_sector: u32, num_sectors: u32) {
        self.first_difat_sector = first_sector;
        self.num_difat_sectors = num_sectors;
    }

    pub(crate) fn set_num_fat_sectors(&mut self, num: u32) {
        self.num_fat_sectors = Some(num);
    }

    pub(crate) fn add_fat_sectors(&mut self, sectors: &[u32]) {
        self.fat_sectors.extend_from_slice(sectors);
    }

    /// Header block, padded to one full sector.
    pub(crate) fn generate(&self) -> Vec<u8> {
        let mut header = vec![0u8; self.sector_size];
        header[0..8].copy_from_slice(MAGIC);
        header[24..26].copy_from_slice(&0x003Eu16.to_le_bytes());
        let major: u16 = if self.sector_size == 512 { 3 } else { 4 };
        header[26..28].copy_from_slice(&major.to_le_bytes());
        header[28..30].copy_from_slice(&0xFFFEu16.to_le_bytes());
        let shift: u16 = if self.sector_size == 512 { 9 } else { 12 };
        header[30..32].copy_from_slice(&shift.to_le_bytes());
        header[32..34].copy_from_slice(&6u16.to_le_bytes());
        header[40..44].copy_from_slice(&self.num_dir_sectors.to_le_bytes());
        let num_fat = self
            .num_fat_sectors
            .unwrap_or(self.fat_sectors.len() as u32);
        header[44..48].copy_from_slice(&num_fat.to_le_bytes());
        header[48..52].copy_from_slice(&self.first_dir_sector.to_le_bytes());
        header[56..60].copy_from_slice(&DEFAULT_MINI_STREAM_CUTOFF.to_le_bytes());
        header[60..64].copy_from_slice(&self.first_minifat_sector.to_le_bytes());
        header[64..68].copy_from_slice(&self.num_minifat_sectors.to_le_bytes());
        header[68..72].copy_from_slice(&self.first_difat_sector.to_le_bytes());
        header[72..76].copy_from_slice(&self.num_difat_sectors.to_le_bytes());
        for i in 0..HEADER_DIFAT_ENTRIES {
            let sector = self.fat_sectors.get(i).copied().unwrap_or(FREESECT);
            let offset = 76 + i * 4;
            header[offset..offset + 4].copy_from_slice(&sector.to_le_bytes());
        }
        header
    }
}

/// Encode one 128-byte directory entry. The left sibling is always empty.
pub(crate) fn encode_dir_entry(
    name: &str,
    kind: u8,
    right: u32,
    child: u32,
    start: u32,
    size: u64,
) -> [u8; DIRENTRY_SIZE] {
    let mut entry = [0u8; DIRENTRY_SIZE];
    let units: Vec<u16> = name.encode_utf16().collect();
    for (i, unit) in units.iter().take(31).enumerate() {
        entry[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    let name_len = ((units.len().min(31) + 1) * 2) as u16;
    entry[64..66].copy_from_slice(&name_len.to_le_bytes());
    entry[66] = kind;
    entry[67] = 1;
    entry[68..72].copy_from_slice(&NOSTREAM.to_le_bytes());
    entry[72..76].copy_from_slice(&right.to_le_bytes());
    entry[76..80].copy_from_slice(&child.to_le_bytes());
    entry[116..120].copy_from_slice(&start.to_le_bytes());
    entry[120..128].copy_from_slice(&size.to_le_bytes());
    entry
}

/// Where the builder put things.
pub(crate) struct Layout {
    pub sector_size: usize,
    pub fat_sectors: Vec<u32>,
    pub streams: Vec<(String, u32)>,
}

impl Layout {
    pub(crate) fn stream_start(&self, name: &str) -> u32 {
        self.streams
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, start)| start)
            .expect("stream was added to the builder")
    }

    pub(crate) fn sector_offset(&self, sector: u32) -> usize {
        (sector as usize + 1) * self.sector_size
    }

    /// Overwrite one FAT entry in a built image.
    pub(crate) fn set_fat_entry(&self, image: &mut [u8], index: u32, value: u32) {
        let per_sector = self.sector_size / 4;
        let fat_sector = self.fat_sectors[index as usize / per_sector];
        let offset = self.sector_offset(fat_sector) + (index as usize % per_sector) * 4;
        image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

/// Sequential sector allocator recording one FAT chain per placement.
struct Allocator {
    sector_size: usize,
    sectors: Vec<Vec<u8>>,
    chains: Vec<(u32, usize)>,
}

impl Allocator {
    fn place(&mut self, data: &[u8]) -> u32 {
        if data.is_empty() {
            return ENDOFCHAIN;
        }
        let start = self.sectors.len() as u32;
        for chunk in data.chunks(self.sector_size) {
            let mut sector = chunk.to_vec();
            sector.resize(self.sector_size, 0);
            self.sectors.push(sector);
        }
        self.chains
            .push((start, data.len().div_ceil(self.sector_size)));
        start
    }
}

/// Builds a complete compound file with a flat list of streams under the
/// root storage.
pub(crate) struct CfbBuilder {
    sector_size: usize,
    streams: Vec<(String, Vec<u8>)>,
    use_mini_stream: bool,
    difat_in_extension: bool,
}

impl CfbBuilder {
    pub(crate) fn new(sector_size: usize) -> Self {
        Self {
            sector_size,
            streams: Vec::new(),
            use_mini_stream: true,
            difat_in_extension: false,
        }
    }

    pub(crate) fn stream(mut self, name: &str, data: Vec<u8>) -> Self {
        self.streams.push((name.to_string(), data));
        self
    }

    /// Store small streams in regular sectors too.
    pub(crate) fn without_mini_stream(mut self) -> Self {
        self.use_mini_stream = false;
        self
    }

    /// List the FAT sectors in a DIFAT extension sector instead of the header.
    pub(crate) fn difat_in_extension(mut self) -> Self {
        self.difat_in_extension = true;
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        self.build_with_layout().0
    }

    pub(crate) fn build_with_layout(self) -> (Vec<u8>, Layout) {
        let s = self.sector_size;
        let per_sector = s / 4;
        let mut alloc = Allocator {
            sector_size: s,
            sectors: Vec::new(),
            chains: Vec::new(),
        };

        // Stream contents: small ones into the mini stream, the rest into sectors.
        let mut ministream = Vec::new();
        let mut minifat: Vec<u32> = Vec::new();
        let mut starts = Vec::new();
        for (name, data) in &self.streams {
            let mini = self.use_mini_stream && data.len() < DEFAULT_MINI_STREAM_CUTOFF as usize;
            let start = if mini {
                if data.is_empty() {
                    ENDOFCHAIN
                } else {
                    let first = minifat.len() as u32;
                    let count = data.len().div_ceil(MINI_SECTOR_SIZE) as u32;
                    for k in 0..count {
                        minifat.push(if k + 1 < count { first + k + 1 } else { ENDOFCHAIN });
                    }
                    ministream.extend_from_slice(data);
                    ministream.resize(minifat.len() * MINI_SECTOR_SIZE, 0);
                    first
                }
            } else {
                alloc.place(data)
            };
            starts.push((name.clone(), start));
        }

        let root_start = alloc.place(&ministream);

        let mut minifat_bytes: Vec<u8> = minifat.iter().flat_map(|v| v.to_le_bytes()).collect();
        let minifat_count = minifat_bytes.len().div_ceil(s) as u32;
        minifat_bytes.resize(minifat_count as usize * s, 0xFF);
        let minifat_start = alloc.place(&minifat_bytes);

        let mut directory = Vec::new();
        let child = if self.streams.is_empty() { NOSTREAM } else { 1 };
        directory.extend_from_slice(&encode_dir_entry(
            "Root Entry",
            STGTY_ROOT,
            NOSTREAM,
            child,
            root_start,
            ministream.len() as u64,
        ));
        for (i, ((_, data), &(_, start))) in self.streams.iter().zip(&starts).enumerate() {
            let sid = i as u32 + 1;
            let right = if i + 1 < self.streams.len() { sid + 1 } else { NOSTREAM };
            directory.extend_from_slice(&encode_dir_entry(
                &self.streams[i].0,
                STGTY_STREAM,
                right,
                NOSTREAM,
                start,
                data.len() as u64,
            ));
        }
        let dir_count = directory.len().div_ceil(s) as u32;
        directory.resize(dir_count as usize * s, 0);
        let dir_start = alloc.place(&directory);

        let difat_sector = if self.difat_in_extension {
            alloc.sectors.push(vec![0u8; s]);
            Some(alloc.sectors.len() as u32 - 1)
        } else {
            None
        };

        let content = alloc.sectors.len();
        let mut fat_count = 1;
        while fat_count * per_sector < content + fat_count {
            fat_count += 1;
        }
        let fat_sectors: Vec<u32> = (content..content + fat_count).map(|i| i as u32).collect();

        let mut fat = vec![FREESECT; fat_count * per_sector];
        for &(start, count) in &alloc.chains {
            for k in 0..count {
                let sector = start as usize + k;
                fat[sector] = if k + 1 < count { sector as u32 + 1 } else { ENDOFCHAIN };
            }
        }
        for &sector in &fat_sectors {
            fat[sector as usize] = FATSECT;
        }

        let mut header = HeaderBuilder::new(s);
        header.set_first_dir_sector(dir_start);
        header.set_num_dir_sectors(dir_count);
        if minifat_count > 0 {
            header.set_minifat(minifat_start, minifat_count);
        }
        if let Some(difat) = difat_sector {
            fat[difat as usize] = DIFSECT;
            let mut pointers = vec![FREESECT; per_sector];
            pointers[..fat_sectors.len()].copy_from_slice(&fat_sectors);
            pointers[per_sector - 1] = ENDOFCHAIN;
            alloc.sectors[difat as usize] = pointers.iter().flat_map(|v| v.to_le_bytes()).collect();
            header.set_difat(difat, 1);
            header.set_num_fat_sectors(fat_sectors.len() as u32);
        } else {
            header.add_fat_sectors(&fat_sectors);
        }

        let mut image = header.generate();
        for sector in &alloc.sectors {
            image.extend_from_slice(sector);
        }
        image.extend(fat.iter().flat_map(|v| v.to_le_bytes()));

        let layout = Layout {
            sector_size: s,
            fat_sectors,
            streams: starts,
        };
        (image, layout)
    }
}

/// A Word 97 FIB with the given flags, ccpText and CLX location.
///
/// The result is exactly `154 + cb_rg_fc_lcb * 8` bytes long.
pub(crate) fn encode_fib(
    flags: u16,
    ccp_text: u32,
    fc_clx: u32,
    lcb_clx: u32,
    cb_rg_fc_lcb: u16,
) -> Vec<u8> {
    let mut fib = vec![0u8; 154 + usize::from(cb_rg_fc_lcb) * 8];
    fib[0..2].copy_from_slice(&0xA5ECu16.to_le_bytes());
    fib[2..4].copy_from_slice(&0x00C1u16.to_le_bytes());
    fib[10..12].copy_from_slice(&flags.to_le_bytes());
    fib[32..34].copy_from_slice(&0x000Eu16.to_le_bytes());
    fib[62..64].copy_from_slice(&0x0016u16.to_le_bytes());
    fib[76..80].copy_from_slice(&ccp_text.to_le_bytes());
    fib[152..154].copy_from_slice(&cb_rg_fc_lcb.to_le_bytes());
    let clx = 154 + 66 * 4;
    if clx + 8 <= fib.len() {
        fib[clx..clx + 4].copy_from_slice(&fc_clx.to_le_bytes());
        fib[clx + 4..clx + 8].copy_from_slice(&lcb_clx.to_le_bytes());
    }
    fib
}

/// A CLX with one-byte-length property runs and a single Pcdt.
///
/// `pcds` holds `(flags, fc_compressed, prm)` triples.
pub(crate) fn encode_clx(prcs: &[&[u8]], cps: &[u32], pcds: &[(u16, u32, u16)]) -> Vec<u8> {
    let mut clx = Vec::new();
    for prc in prcs {
        clx.push(0x01);
        clx.push(prc.len() as u8);
        clx.extend_from_slice(prc);
    }
    let mut plc = Vec::new();
    for cp in cps {
        plc.extend_from_slice(&cp.to_le_bytes());
    }
    for (flags, fc, prm) in pcds {
        plc.extend_from_slice(&flags.to_le_bytes());
        plc.extend_from_slice(&fc.to_le_bytes());
        plc.extend_from_slice(&prm.to_le_bytes());
    }
    clx.push(0x02);
    clx.extend_from_slice(&(plc.len() as u32).to_le_bytes());
    clx.extend_from_slice(&plc);
    clx
}

/// A PowerPoint record: header followed by the payload.
pub(crate) fn encode_ppt_record(
    version: u8,
    instance: u16,
    rec_type: u16,
    payload: &[u8],
) -> Vec<u8> {
    let ver_inst = (u16::from(version) & 0x000F) | (instance << 4);
    let mut record = Vec::with_capacity(8 + payload.len());
    record.extend_from_slice(&ver_inst.to_le_bytes());
    record.extend_from_slice(&rec_type.to_le_bytes());
    record.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    record.extend_from_slice(payload);
    record
}

/// A BIFF record: type, length, payload.
pub(crate) fn encode_biff(record_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(4 + payload.len());
    record.extend_from_slice(&record_type.to_le_bytes());
    record.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    record.extend_from_slice(payload);
    record
}

/// UTF-16LE bytes of `text`.
pub(crate) fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}
