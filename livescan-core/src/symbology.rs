use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// 解码器启用的码制集合
    ///
    /// 码制的实际识别由外部解码器完成，这里只负责描述 "读哪些"。
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
    pub struct Symbologies: u32 {
        /// EAN-13 - 零售商品最常用
        const EAN_13 = 1 << 0;
        const EAN_8 = 1 << 1;
        const UPC_A = 1 << 2;
        const UPC_E = 1 << 3;
        /// Code 128 - 物流标签
        const CODE_128 = 1 << 4;
        const CODE_39 = 1 << 5;
        const CODE_93 = 1 << 6;
        const CODABAR = 1 << 7;
        /// Interleaved 2 of 5
        const I2OF5 = 1 << 8;

        /// EAN/UPC 全家
        const RETAIL = Self::EAN_13.bits()
            | Self::EAN_8.bits()
            | Self::UPC_A.bits()
            | Self::UPC_E.bits();
    }
}

impl Symbologies {
    /// 每种码制对应的解码器 reader 名称 (quagga 风格命名)
    pub fn reader_names(&self) -> Vec<&'static str> {
        const NAMES: [(Symbologies, &str); 9] = [
            (Symbologies::EAN_13, "ean_reader"),
            (Symbologies::EAN_8, "ean_8_reader"),
            (Symbologies::UPC_A, "upc_reader"),
            (Symbologies::UPC_E, "upc_e_reader"),
            (Symbologies::CODE_128, "code_128_reader"),
            (Symbologies::CODE_39, "code_39_reader"),
            (Symbologies::CODE_93, "code_93_reader"),
            (Symbologies::CODABAR, "codabar_reader"),
            (Symbologies::I2OF5, "i2of5_reader"),
        ];

        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Default for Symbologies {
    fn default() -> Self {
        Symbologies::EAN_13
    }
}

impl fmt::Debug for Symbologies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbologies({})", self.reader_names().join(", "))
    }
}
