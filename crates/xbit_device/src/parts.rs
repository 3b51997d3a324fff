//! Per-part RAMB36 tile tables.
//!
//! Each row gives the X/Y fabric location of a physical RAMB36 tile and the
//! absolute bit offset of its first configuration bit inside the SLR frame
//! data. The offsets were recovered from logic-location files emitted for
//! single-BRAM reference designs on each part; the X/Y interleave in the
//! tables mirrors the column order of the configuration array.

use crate::bram::BramTile;

/// RAMB36E1 tiles of the XC7Z010 (60 tiles).
pub const XC7Z010_RAMB36: &[BramTile] = &[
    BramTile::at(0, 0, 0x00EB0AC0), BramTile::at(0, 1, 0x00EB0C00), BramTile::at(0, 2, 0x00EB0D40),
    BramTile::at(0, 3, 0x00EB0E80), BramTile::at(0, 4, 0x00EB0FC0), BramTile::at(0, 5, 0x00EB1120),
    BramTile::at(0, 6, 0x00EB1260), BramTile::at(0, 7, 0x00EB13A0), BramTile::at(0, 8, 0x00EB14E0),
    BramTile::at(0, 9, 0x00EB1620), BramTile::at(0, 10, 0x00CB6180), BramTile::at(0, 11, 0x00CB62C0),
    BramTile::at(0, 12, 0x00CB6400), BramTile::at(0, 13, 0x00CB6540), BramTile::at(0, 14, 0x00CB6680),
    BramTile::at(0, 15, 0x00CB67E0), BramTile::at(0, 16, 0x00CB6920), BramTile::at(0, 17, 0x00CB6A60),
    BramTile::at(0, 18, 0x00CB6BA0), BramTile::at(0, 19, 0x00CB6CE0), BramTile::at(1, 0, 0x00F15AC0),
    BramTile::at(1, 1, 0x00F15C00), BramTile::at(1, 2, 0x00F15D40), BramTile::at(1, 3, 0x00F15E80),
    BramTile::at(1, 4, 0x00F15FC0), BramTile::at(1, 5, 0x00F16120), BramTile::at(1, 6, 0x00F16260),
    BramTile::at(1, 7, 0x00F163A0), BramTile::at(1, 8, 0x00F164E0), BramTile::at(1, 9, 0x00F16620),
    BramTile::at(1, 10, 0x00D1B180), BramTile::at(1, 11, 0x00D1B2C0), BramTile::at(1, 12, 0x00D1B400),
    BramTile::at(1, 13, 0x00D1B540), BramTile::at(1, 14, 0x00D1B680), BramTile::at(1, 15, 0x00D1B7E0),
    BramTile::at(1, 16, 0x00D1B920), BramTile::at(1, 17, 0x00D1BA60), BramTile::at(1, 18, 0x00D1BBA0),
    BramTile::at(1, 19, 0x00D1BCE0), BramTile::at(2, 0, 0x00F7AAC0), BramTile::at(2, 1, 0x00F7AC00),
    BramTile::at(2, 2, 0x00F7AD40), BramTile::at(2, 3, 0x00F7AE80), BramTile::at(2, 4, 0x00F7AFC0),
    BramTile::at(2, 5, 0x00F7B120), BramTile::at(2, 6, 0x00F7B260), BramTile::at(2, 7, 0x00F7B3A0),
    BramTile::at(2, 8, 0x00F7B4E0), BramTile::at(2, 9, 0x00F7B620), BramTile::at(2, 10, 0x00D80180),
    BramTile::at(2, 11, 0x00D802C0), BramTile::at(2, 12, 0x00D80400), BramTile::at(2, 13, 0x00D80540),
    BramTile::at(2, 14, 0x00D80680), BramTile::at(2, 15, 0x00D807E0), BramTile::at(2, 16, 0x00D80920),
    BramTile::at(2, 17, 0x00D80A60), BramTile::at(2, 18, 0x00D80BA0), BramTile::at(2, 19, 0x00D80CE0),
];

/// RAMB36E1 tiles of the XC7Z015 (95 tiles).
pub const XC7Z015_RAMB36: &[BramTile] = &[
    BramTile::at(0, 0, 0x0192EA40), BramTile::at(0, 1, 0x0192EB80), BramTile::at(0, 2, 0x0192ECC0),
    BramTile::at(0, 3, 0x0192EE00), BramTile::at(0, 4, 0x0192EF40), BramTile::at(0, 5, 0x0192F0A0),
    BramTile::at(0, 6, 0x0192F1E0), BramTile::at(0, 7, 0x0192F320), BramTile::at(0, 8, 0x0192F460),
    BramTile::at(0, 9, 0x0192F5A0), BramTile::at(1, 0, 0x01993A40), BramTile::at(1, 1, 0x01993B80),
    BramTile::at(1, 2, 0x01993CC0), BramTile::at(1, 3, 0x01993E00), BramTile::at(1, 4, 0x01993F40),
    BramTile::at(1, 5, 0x019940A0), BramTile::at(1, 6, 0x019941E0), BramTile::at(1, 7, 0x01994320),
    BramTile::at(1, 8, 0x01994460), BramTile::at(1, 9, 0x019945A0), BramTile::at(2, 0, 0x019F8A40),
    BramTile::at(2, 1, 0x019F8B80), BramTile::at(2, 2, 0x019F8CC0), BramTile::at(2, 3, 0x019F8E00),
    BramTile::at(2, 4, 0x019F8F40), BramTile::at(2, 5, 0x019F90A0), BramTile::at(2, 6, 0x019F91E0),
    BramTile::at(2, 7, 0x019F9320), BramTile::at(2, 8, 0x019F9460), BramTile::at(2, 9, 0x019F95A0),
    BramTile::at(2, 10, 0x017FE100), BramTile::at(2, 11, 0x017FE240), BramTile::at(2, 12, 0x017FE380),
    BramTile::at(2, 13, 0x017FE4C0), BramTile::at(2, 14, 0x017FE600), BramTile::at(2, 15, 0x017FE760),
    BramTile::at(2, 16, 0x017FE8A0), BramTile::at(2, 17, 0x017FE9E0), BramTile::at(2, 18, 0x017FEB20),
    BramTile::at(2, 19, 0x017FEC60), BramTile::at(2, 20, 0x016037C0), BramTile::at(2, 21, 0x01603900),
    BramTile::at(2, 22, 0x01603A40), BramTile::at(2, 23, 0x01603B80), BramTile::at(2, 24, 0x01603CC0),
    BramTile::at(2, 25, 0x01603E20), BramTile::at(2, 26, 0x01603F60), BramTile::at(2, 27, 0x016040A0),
    BramTile::at(2, 28, 0x016041E0), BramTile::at(2, 29, 0x01604320), BramTile::at(3, 5, 0x01A5E0A0),
    BramTile::at(3, 6, 0x01A5E1E0), BramTile::at(3, 7, 0x01A5E320), BramTile::at(3, 8, 0x01A5E460),
    BramTile::at(3, 9, 0x01A5E5A0), BramTile::at(3, 10, 0x01863100), BramTile::at(3, 11, 0x01863240),
    BramTile::at(3, 12, 0x01863380), BramTile::at(3, 13, 0x018634C0), BramTile::at(3, 14, 0x01863600),
    BramTile::at(3, 15, 0x01863760), BramTile::at(3, 16, 0x018638A0), BramTile::at(3, 17, 0x018639E0),
    BramTile::at(3, 18, 0x01863B20), BramTile::at(3, 19, 0x01863C60), BramTile::at(3, 20, 0x016687C0),
    BramTile::at(3, 21, 0x01668900), BramTile::at(3, 22, 0x01668A40), BramTile::at(3, 23, 0x01668B80),
    BramTile::at(3, 24, 0x01668CC0), BramTile::at(3, 25, 0x01668E20), BramTile::at(3, 26, 0x01668F60),
    BramTile::at(3, 27, 0x016690A0), BramTile::at(3, 28, 0x016691E0), BramTile::at(3, 29, 0x01669320),
    BramTile::at(4, 10, 0x018C8100), BramTile::at(4, 11, 0x018C8240), BramTile::at(4, 12, 0x018C8380),
    BramTile::at(4, 13, 0x018C84C0), BramTile::at(4, 14, 0x018C8600), BramTile::at(4, 15, 0x018C8760),
    BramTile::at(4, 16, 0x018C88A0), BramTile::at(4, 17, 0x018C89E0), BramTile::at(4, 18, 0x018C8B20),
    BramTile::at(4, 19, 0x018C8C60), BramTile::at(4, 20, 0x016CD7C0), BramTile::at(4, 21, 0x016CD900),
    BramTile::at(4, 22, 0x016CDA40), BramTile::at(4, 23, 0x016CDB80), BramTile::at(4, 24, 0x016CDCC0),
    BramTile::at(4, 25, 0x016CDE20), BramTile::at(4, 26, 0x016CDF60), BramTile::at(4, 27, 0x016CE0A0),
    BramTile::at(4, 28, 0x016CE1E0), BramTile::at(4, 29, 0x016CE320),
];

/// RAMB36E1 tiles of the XC7Z020 (140 tiles).
pub const XC7Z020_RAMB36: &[BramTile] = &[
    BramTile::at(0, 0, 0x01C795C0), BramTile::at(0, 1, 0x01C79700), BramTile::at(0, 2, 0x01C79840),
    BramTile::at(0, 3, 0x01C79980), BramTile::at(0, 4, 0x01C79AC0), BramTile::at(0, 5, 0x01C79C20),
    BramTile::at(0, 6, 0x01C79D60), BramTile::at(4, 0, 0x01E0D5C0), BramTile::at(0, 7, 0x01C79EA0),
    BramTile::at(4, 1, 0x01E0D700), BramTile::at(0, 8, 0x01C79FE0), BramTile::at(4, 2, 0x01E0D840),
    BramTile::at(0, 9, 0x01C7A120), BramTile::at(4, 3, 0x01E0D980), BramTile::at(4, 4, 0x01E0DAC0),
    BramTile::at(4, 5, 0x01E0DC20), BramTile::at(4, 6, 0x01E0DD60), BramTile::at(4, 7, 0x01E0DEA0),
    BramTile::at(4, 8, 0x01E0DFE0), BramTile::at(1, 0, 0x01CDE5C0), BramTile::at(4, 9, 0x01E0E120),
    BramTile::at(1, 1, 0x01CDE700), BramTile::at(4, 10, 0x01BADC80), BramTile::at(1, 2, 0x01CDE840),
    BramTile::at(4, 11, 0x01BADDC0), BramTile::at(1, 3, 0x01CDE980), BramTile::at(4, 12, 0x01BADF00),
    BramTile::at(1, 4, 0x01CDEAC0), BramTile::at(4, 13, 0x01BAE040), BramTile::at(1, 5, 0x01CDEC20),
    BramTile::at(4, 14, 0x01BAE180), BramTile::at(1, 6, 0x01CDED60), BramTile::at(4, 15, 0x01BAE2E0),
    BramTile::at(1, 7, 0x01CDEEA0), BramTile::at(4, 16, 0x01BAE420), BramTile::at(1, 8, 0x01CDEFE0),
    BramTile::at(4, 17, 0x01BAE560), BramTile::at(1, 9, 0x01CDF120), BramTile::at(4, 18, 0x01BAE6A0),
    BramTile::at(4, 19, 0x01BAE7E0), BramTile::at(4, 20, 0x0194E340), BramTile::at(2, 0, 0x01D435C0),
    BramTile::at(4, 21, 0x0194E480), BramTile::at(2, 1, 0x01D43700), BramTile::at(4, 22, 0x0194E5C0),
    BramTile::at(2, 2, 0x01D43840), BramTile::at(4, 23, 0x0194E700), BramTile::at(2, 3, 0x01D43980),
    BramTile::at(4, 24, 0x0194E840), BramTile::at(2, 4, 0x01D43AC0), BramTile::at(4, 25, 0x0194E9A0),
    BramTile::at(2, 5, 0x01D43C20), BramTile::at(4, 26, 0x0194EAE0), BramTile::at(2, 6, 0x01D43D60),
    BramTile::at(4, 27, 0x0194EC20), BramTile::at(2, 7, 0x01D43EA0), BramTile::at(4, 28, 0x0194ED60),
    BramTile::at(2, 8, 0x01D43FE0), BramTile::at(4, 29, 0x0194EEA0), BramTile::at(2, 9, 0x01D44120),
    BramTile::at(2, 10, 0x01AE3C80), BramTile::at(2, 11, 0x01AE3DC0), BramTile::at(2, 12, 0x01AE3F00),
    BramTile::at(2, 13, 0x01AE4040), BramTile::at(2, 14, 0x01AE4180), BramTile::at(2, 15, 0x01AE42E0),
    BramTile::at(5, 0, 0x01E725C0), BramTile::at(2, 16, 0x01AE4420), BramTile::at(5, 1, 0x01E72700),
    BramTile::at(2, 17, 0x01AE4560), BramTile::at(5, 2, 0x01E72840), BramTile::at(2, 18, 0x01AE46A0),
    BramTile::at(5, 3, 0x01E72980), BramTile::at(2, 19, 0x01AE47E0), BramTile::at(5, 4, 0x01E72AC0),
    BramTile::at(5, 5, 0x01E72C20), BramTile::at(2, 20, 0x01884340), BramTile::at(5, 6, 0x01E72D60),
    BramTile::at(2, 21, 0x01884480), BramTile::at(5, 7, 0x01E72EA0), BramTile::at(2, 22, 0x018845C0),
    BramTile::at(5, 8, 0x01E72FE0), BramTile::at(2, 23, 0x01884700), BramTile::at(5, 9, 0x01E73120),
    BramTile::at(2, 24, 0x01884840), BramTile::at(5, 10, 0x01C12C80), BramTile::at(2, 25, 0x018849A0),
    BramTile::at(5, 11, 0x01C12DC0), BramTile::at(2, 26, 0x01884AE0), BramTile::at(5, 12, 0x01C12F00),
    BramTile::at(2, 27, 0x01884C20), BramTile::at(5, 13, 0x01C13040), BramTile::at(2, 28, 0x01884D60),
    BramTile::at(5, 14, 0x01C13180), BramTile::at(2, 29, 0x01884EA0), BramTile::at(5, 15, 0x01C132E0),
    BramTile::at(5, 16, 0x01C13420), BramTile::at(5, 17, 0x01C13560), BramTile::at(5, 18, 0x01C136A0),
    BramTile::at(5, 19, 0x01C137E0), BramTile::at(3, 0, 0x01DA85C0), BramTile::at(5, 20, 0x019B3340),
    BramTile::at(3, 1, 0x01DA8700), BramTile::at(5, 21, 0x019B3480), BramTile::at(3, 2, 0x01DA8840),
    BramTile::at(5, 22, 0x019B35C0), BramTile::at(3, 3, 0x01DA8980), BramTile::at(5, 23, 0x019B3700),
    BramTile::at(3, 4, 0x01DA8AC0), BramTile::at(5, 24, 0x019B3840), BramTile::at(3, 5, 0x01DA8C20),
    BramTile::at(5, 25, 0x019B39A0), BramTile::at(3, 6, 0x01DA8D60), BramTile::at(5, 26, 0x019B3AE0),
    BramTile::at(3, 7, 0x01DA8EA0), BramTile::at(5, 27, 0x019B3C20), BramTile::at(3, 8, 0x01DA8FE0),
    BramTile::at(5, 28, 0x019B3D60), BramTile::at(3, 9, 0x01DA9120), BramTile::at(5, 29, 0x019B3EA0),
    BramTile::at(3, 10, 0x01B48C80), BramTile::at(3, 11, 0x01B48DC0), BramTile::at(3, 12, 0x01B48F00),
    BramTile::at(3, 13, 0x01B49040), BramTile::at(3, 14, 0x01B49180), BramTile::at(3, 15, 0x01B492E0),
    BramTile::at(3, 16, 0x01B49420), BramTile::at(3, 17, 0x01B49560), BramTile::at(3, 18, 0x01B496A0),
    BramTile::at(3, 19, 0x01B497E0), BramTile::at(3, 20, 0x018E9340), BramTile::at(3, 21, 0x018E9480),
    BramTile::at(3, 22, 0x018E95C0), BramTile::at(3, 23, 0x018E9700), BramTile::at(3, 24, 0x018E9840),
    BramTile::at(3, 25, 0x018E99A0), BramTile::at(3, 26, 0x018E9AE0), BramTile::at(3, 27, 0x018E9C20),
    BramTile::at(3, 28, 0x018E9D60), BramTile::at(3, 29, 0x018E9EA0),
];
